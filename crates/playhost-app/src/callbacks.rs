//! Engine callback sink
//!
//! Adapts a [`Session`] to the engine's [`EngineCallbacks`] contract.

use std::sync::Arc;

use crate::session::Session;
use playhost_core::CursorMode;
use playhost_engine::EngineCallbacks;

/// Forwards engine notifications to a session, one call per callback
#[derive(Debug, Clone)]
pub struct SessionCallbacks {
    session: Arc<Session>,
}

impl SessionCallbacks {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl EngineCallbacks for SessionCallbacks {
    fn on_cursor_mode_change(&self, mode: CursorMode) {
        self.session.on_cursor_mode_change(mode);
    }

    fn on_log(&self, line: &str) {
        self.session.on_log(line);
    }

    fn on_exit(&self, code: i32) {
        self.session.on_exit(code);
    }

    fn on_graphic_output(&self) {
        self.session.on_graphic_output();
    }
}

impl Session {
    /// Callback sink to hand to the engine
    pub fn callbacks(self: &Arc<Self>) -> Arc<dyn EngineCallbacks> {
        Arc::new(SessionCallbacks::new(Arc::clone(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestSession;
    use crate::ui::UiCommand;
    use playhost_core::EngineEvent;
    use playhost_engine::dispatch_event;
    use playhost_engine::test_utils::RecordingEngine;
    use tempfile::tempdir;

    #[test]
    fn test_events_reach_session() {
        let dir = tempdir().unwrap();
        let mut t = TestSession::new(dir.path().join("menu_settings.toml"));
        let engine = Arc::new(RecordingEngine::new(dir.path().join("latest.log")));
        t.session.setup(Some(engine)).unwrap();
        let callbacks = t.session.callbacks();

        dispatch_event(
            callbacks.as_ref(),
            EngineEvent::CursorModeChanged(CursorMode::Disabled),
        );
        dispatch_event(callbacks.as_ref(), EngineEvent::Log("one".into()));
        dispatch_event(callbacks.as_ref(), EngineEvent::GraphicOutput);
        dispatch_event(callbacks.as_ref(), EngineEvent::Exited { code: 0 });

        assert_eq!(t.session.cursor().cursor_mode(), CursorMode::Disabled);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("latest.log")).unwrap(),
            "one\n"
        );
        assert_eq!(t.terminator.codes(), vec![0]);

        t.drain_ui();
        assert_eq!(
            t.host.calls(),
            vec![
                UiCommand::ShowProgressOverlay,
                UiCommand::SetCursorVisible(false),
                UiCommand::RemoveProgressOverlay,
            ]
        );
    }

    #[test]
    fn test_concurrent_callbacks() {
        let dir = tempdir().unwrap();
        let mut t = TestSession::new(dir.path().join("menu_settings.toml"));
        let engine = Arc::new(RecordingEngine::new(dir.path().join("latest.log")));
        t.session.setup(Some(engine)).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|i| {
                let callbacks = t.session.callbacks();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        callbacks.on_log(&format!("{}:{}", i, j));
                        callbacks.on_cursor_mode_change(if j % 2 == 0 {
                            CursorMode::Disabled
                        } else {
                            CursorMode::Enabled
                        });
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        t.session.on_cursor_mode_change(CursorMode::Disabled);

        let log = std::fs::read_to_string(dir.path().join("latest.log")).unwrap();
        assert_eq!(log.lines().count(), 200);

        t.drain_ui();
        assert_eq!(t.host.cursor_visible(), Some(false));
    }
}
