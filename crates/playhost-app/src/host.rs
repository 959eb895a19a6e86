//! Host-facing collaborator contracts
//!
//! The session never touches presentation directly. Cursor and overlay
//! changes go through [`HostUi`] on the UI context (see [`crate::ui`]);
//! crash reporting and termination are synchronous hand-offs made by the
//! exit path.

use std::path::Path;

use playhost_core::prelude::*;

/// Presentation surface owned by the host UI context.
///
/// Only ever invoked from the UI context.
pub trait HostUi {
    /// Show or hide the on-screen cursor indicator
    fn set_cursor_visible(&self, visible: bool);

    /// Show the startup progress overlay
    fn show_progress_overlay(&self);

    /// Remove the startup progress overlay
    fn remove_progress_overlay(&self);
}

/// Presents a crash report for an abnormal engine exit.
///
/// Called right before termination, so implementations must finish their
/// hand-off (spawn a reporter, write a file) before returning.
pub trait CrashReporter: Send + Sync {
    fn show_crash_report(&self, exit_code: i32, log_path: Option<&Path>);
}

/// Ends the hosting process
pub trait Terminator: Send + Sync {
    fn terminate(&self, exit_code: i32);
}

/// Terminates the current process with the engine's exit code
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, exit_code: i32) {
        info!("Terminating host process (engine exit code {})", exit_code);
        std::process::exit(exit_code);
    }
}
