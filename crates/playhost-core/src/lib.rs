//! # playhost-core - Core Domain Types
//!
//! Foundation crate for playhost. Provides domain types, error handling,
//! engine event definitions and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, toml, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`CursorMode`] - Engine cursor mode (Enabled, Disabled)
//! - [`Position`] - Device-space coordinate pair
//! - [`InteractionMode`] - Pointer-driven vs touch-driven interaction
//! - [`KeyCode`], [`MouseEvent`], [`MouseButton`] - Outbound input events
//! - [`SessionPhase`] - Session lifecycle phase (Created, Active, Exited)
//! - [`ExitKind`] - Normal vs crashed engine exit
//!
//! ### Events (`events`)
//! - [`EngineEvent`] - Inbound engine notifications
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `is_fatal` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use playhost_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod prelude;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use events::{CursorModeChange, EngineEvent};
pub use types::{
    CursorMode, ExitKind, InteractionMode, KeyCode, MouseButton, MouseEvent, Position,
    SessionPhase,
};
