//! Cursor and pointer state shared between engine callbacks and the UI

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ui::{UiCommand, UiDispatcher};
use playhost_core::prelude::*;
use playhost_core::{CursorMode, Position};

#[derive(Debug, Default)]
struct Inner {
    mode: CursorMode,
    cursor_pos: Position,
    pointer_pos: Position,
}

/// Cursor mode, cursor position and raw pointer position.
///
/// Reads and writes are safe from any thread. Visibility changes are never
/// applied here; they are posted to the UI context.
#[derive(Debug)]
pub struct CursorState {
    inner: Mutex<Inner>,
    ui: UiDispatcher,
}

impl CursorState {
    pub fn new(ui: UiDispatcher) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ui,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Plain data; a panic mid-update cannot leave it inconsistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.lock().mode
    }

    pub fn cursor_pos(&self) -> Position {
        self.lock().cursor_pos
    }

    pub fn pointer_pos(&self) -> Position {
        self.lock().pointer_pos
    }

    pub fn set_cursor_pos(&self, x: i32, y: i32) {
        self.lock().cursor_pos = Position::new(x, y);
    }

    pub fn set_pointer_pos(&self, x: i32, y: i32) {
        self.lock().pointer_pos = Position::new(x, y);
    }

    /// Store a new cursor mode and ask the UI to show or hide the cursor.
    ///
    /// The visibility command is posted while the lock is held, so the UI
    /// applies visibility changes in exactly the order the modes were stored.
    pub fn apply_cursor_mode_change(&self, mode: CursorMode) {
        let mut inner = self.lock();
        if inner.mode != mode {
            debug!("Cursor mode {} -> {}", inner.mode, mode);
        }
        inner.mode = mode;
        self.ui.post(UiCommand::SetCursorVisible(mode.is_visible()));
    }
}
