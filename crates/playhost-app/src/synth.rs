//! Outbound input synthesis

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use playhost_core::prelude::*;
use playhost_core::{KeyCode, MouseEvent};
use playhost_engine::EngineHandle;

/// The session's reference to a live engine.
///
/// Empty for simulated sessions and after the engine exits. Every outbound
/// send happens while this lock is held, so detaching waits for an
/// in-flight send and nothing is sent afterwards.
#[derive(Default)]
pub struct EngineLink {
    handle: Mutex<Option<Arc<dyn EngineHandle>>>,
}

impl std::fmt::Debug for EngineLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineLink")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl EngineLink {
    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn EngineHandle>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn attach(&self, handle: Arc<dyn EngineHandle>) {
        *self.lock() = Some(handle);
    }

    /// Drop the engine reference; later sends become no-ops
    pub fn detach(&self) {
        if self.lock().take().is_some() {
            debug!("Engine detached from session");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `f` against the engine if one is attached.
    ///
    /// Returns `None` when detached.
    pub fn with_engine<R>(&self, f: impl FnOnce(&dyn EngineHandle) -> R) -> Option<R> {
        let guard = self.lock();
        guard.as_deref().map(f)
    }
}

/// Turns logical actions into ordered engine input
#[derive(Debug, Clone)]
pub struct KeySynthesizer {
    link: Arc<EngineLink>,
}

impl KeySynthesizer {
    pub fn new(link: Arc<EngineLink>) -> Self {
        Self { link }
    }

    /// Press and release `code` as one uninterruptible pair.
    ///
    /// No-op without a live engine. Send failures are logged; the release
    /// is still attempted after a failed press.
    pub fn tap_key(&self, code: KeyCode) {
        let sent = self.link.with_engine(|engine| {
            if let Err(e) = engine.send_key_event(code, true) {
                warn!("Failed to send key-down {:?}: {}", code, e);
            }
            if let Err(e) = engine.send_key_event(code, false) {
                warn!("Failed to send key-up {:?}: {}", code, e);
            }
        });
        if sent.is_none() {
            trace!("No engine attached, not synthesizing {:?}", code);
        }
    }

    /// Synthesize an escape key press
    pub fn synthesize_escape(&self) {
        debug!("Synthesizing escape");
        self.tap_key(KeyCode::ESC);
    }

    /// Forward a pointer event. No-op without a live engine.
    pub fn send_mouse(&self, event: MouseEvent) {
        self.link.with_engine(|engine| {
            if let Err(e) = engine.send_mouse_event(event) {
                warn!("Failed to send mouse event {:?}: {}", event, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use playhost_engine::test_utils::{RecordingEngine, SentInput};
    use playhost_engine::MockEngineHandle;

    #[test]
    fn test_escape_is_down_then_up() {
        let mut engine = MockEngineHandle::new();
        let mut seq = Sequence::new();
        engine
            .expect_send_key_event()
            .withf(|code, down| *code == KeyCode::ESC && *down)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        engine
            .expect_send_key_event()
            .withf(|code, down| *code == KeyCode::ESC && !*down)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let link = Arc::new(EngineLink::default());
        link.attach(Arc::new(engine));
        KeySynthesizer::new(link).synthesize_escape();
    }

    #[test]
    fn test_no_engine_is_noop() {
        let link = Arc::new(EngineLink::default());
        let synth = KeySynthesizer::new(link.clone());
        synth.synthesize_escape();
        assert!(!link.is_attached());
    }

    #[test]
    fn test_detached_engine_receives_nothing() {
        let engine = Arc::new(RecordingEngine::new("/tmp/log"));
        let link = Arc::new(EngineLink::default());
        link.attach(engine.clone());
        link.detach();

        KeySynthesizer::new(link).synthesize_escape();
        assert!(engine.sent().is_empty());
    }

    #[test]
    fn test_send_failure_is_not_propagated() {
        let engine = Arc::new(RecordingEngine::new("/tmp/log"));
        engine.reject_input();
        let link = Arc::new(EngineLink::default());
        link.attach(engine.clone());

        KeySynthesizer::new(link).synthesize_escape();
        assert!(engine.sent().is_empty());
    }

    #[test]
    fn test_concurrent_pairs_never_interleave() {
        let engine = Arc::new(RecordingEngine::new("/tmp/log"));
        let link = Arc::new(EngineLink::default());
        link.attach(engine.clone());
        let synth = KeySynthesizer::new(link);

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let synth = synth.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        synth.synthesize_escape();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let keys = engine.sent_keys();
        assert_eq!(keys.len(), 1600);
        for pair in keys.chunks(2) {
            assert_eq!(pair, [(KeyCode::ESC, true), (KeyCode::ESC, false)]);
        }
    }

    #[test]
    fn test_mouse_forwarding() {
        let engine = Arc::new(RecordingEngine::new("/tmp/log"));
        let link = Arc::new(EngineLink::default());
        link.attach(engine.clone());

        KeySynthesizer::new(link).send_mouse(MouseEvent::Move { x: 3, y: -4 });
        assert_eq!(
            engine.sent(),
            vec![SentInput::Mouse(MouseEvent::Move { x: 3, y: -4 })]
        );
    }
}
