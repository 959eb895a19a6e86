//! playhost-app - Session control and host orchestration for playhost
//!
//! This crate implements the play session: cursor state shared with the UI,
//! log capture, input synthesis, the engine callback sink, menu settings
//! persistence, and the host traits the session talks to.

pub mod callbacks;
pub mod config;
pub mod cursor;
pub mod host;
pub mod log_capture;
pub mod session;
pub mod synth;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod ui;

// Re-export primary types
pub use callbacks::SessionCallbacks;
pub use config::{MenuSettings, MenuSettingsHandle, SettingsStore};
pub use cursor::CursorState;
pub use host::{CrashReporter, HostUi, ProcessTerminator, Terminator};
pub use log_capture::LogCapture;
pub use session::{Session, SessionDeps};
pub use synth::{EngineLink, KeySynthesizer};
pub use ui::{ui_channel, UiCommand, UiDispatcher, UiQueue};
