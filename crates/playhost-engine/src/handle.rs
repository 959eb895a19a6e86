//! Engine capability and callback contracts
//!
//! [`EngineHandle`] is the outbound side: what the host may ask of a running
//! engine. [`EngineCallbacks`] is the inbound side: what the engine reports
//! back. Engines may invoke callbacks from any of their own threads.

use std::path::PathBuf;

use playhost_core::prelude::*;
use playhost_core::{CursorMode, EngineEvent, KeyCode, MouseEvent};

/// Capability representing a running engine.
///
/// Implementations must not block; sends are queued for the engine.
#[cfg_attr(any(test, feature = "test-helpers"), mockall::automock)]
pub trait EngineHandle: Send + Sync {
    /// Queue a key press (`is_down = true`) or release for the engine
    fn send_key_event(&self, code: KeyCode, is_down: bool) -> Result<()>;

    /// Queue a pointer event for the engine
    fn send_mouse_event(&self, event: MouseEvent) -> Result<()>;

    /// File the engine's log output should be captured to
    fn log_path(&self) -> PathBuf;
}

/// Receiver for asynchronous engine notifications.
///
/// Callbacks can arrive concurrently from several threads; implementations
/// must be internally synchronized.
pub trait EngineCallbacks: Send + Sync {
    fn on_cursor_mode_change(&self, mode: CursorMode);

    fn on_log(&self, line: &str);

    fn on_exit(&self, code: i32);

    /// The engine rendered its first frame. Optional for engines that
    /// cannot tell.
    fn on_graphic_output(&self) {}
}

/// Route a parsed engine event to the matching callback
pub fn dispatch_event(callbacks: &dyn EngineCallbacks, event: EngineEvent) {
    trace!("Dispatching engine event: {}", event.event_type());
    match event {
        EngineEvent::CursorModeChanged(mode) => callbacks.on_cursor_mode_change(mode),
        EngineEvent::Log(line) => callbacks.on_log(&line),
        EngineEvent::GraphicOutput => callbacks.on_graphic_output(),
        EngineEvent::Exited { code } => callbacks.on_exit(code),
    }
}
