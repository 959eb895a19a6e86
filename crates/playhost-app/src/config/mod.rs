//! Menu settings for playhost
//!
//! Supports:
//! - `menu_settings.toml` - Operator menu preferences, persisted on change

pub mod observable;
pub mod store;
pub mod types;

pub use observable::MenuSettingsHandle;
pub use store::{playhost_home, SettingsStore, HOME_ENV_VAR, SETTINGS_FILENAME};
pub use types::{GestureMode, MenuSettings, MouseMoveMode};
