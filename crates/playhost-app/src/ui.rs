//! Dispatch onto the host UI context
//!
//! Any context may post a [`UiCommand`] through a [`UiDispatcher`]. The UI
//! context owns the matching [`UiQueue`] and applies commands to its
//! [`HostUi`] in the order they were posted.

use tokio::sync::mpsc;

use crate::host::HostUi;
use playhost_core::prelude::*;

/// A presentation change to perform on the UI context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    SetCursorVisible(bool),
    ShowProgressOverlay,
    RemoveProgressOverlay,
}

impl UiCommand {
    /// Perform this command against the host
    pub fn apply(self, host: &dyn HostUi) {
        match self {
            UiCommand::SetCursorVisible(visible) => host.set_cursor_visible(visible),
            UiCommand::ShowProgressOverlay => host.show_progress_overlay(),
            UiCommand::RemoveProgressOverlay => host.remove_progress_overlay(),
        }
    }
}

/// Create a connected dispatcher/queue pair
pub fn ui_channel() -> (UiDispatcher, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, UiQueue { rx })
}

/// Posting side, cloneable and usable from any thread
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiDispatcher {
    /// Queue a command for the UI context. Never blocks.
    ///
    /// Returns `false` if the UI context has gone away.
    pub fn post(&self, command: UiCommand) -> bool {
        match self.tx.send(command) {
            Ok(()) => true,
            Err(_) => {
                debug!("UI queue closed, dropping {:?}", command);
                false
            }
        }
    }
}

/// Receiving side, owned by the UI context
#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<UiCommand>,
}

impl UiQueue {
    /// Apply every command posted so far. Returns how many were applied.
    pub fn drain(&mut self, host: &dyn HostUi) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.rx.try_recv() {
            trace!("UI applying {:?}", command);
            command.apply(host);
            applied += 1;
        }
        applied
    }

    /// Wait for the next command and apply it.
    ///
    /// Returns `false` once every dispatcher has been dropped.
    pub async fn apply_next(&mut self, host: &dyn HostUi) -> bool {
        match self.rx.recv().await {
            Some(command) => {
                trace!("UI applying {:?}", command);
                command.apply(host);
                true
            }
            None => false,
        }
    }
}
