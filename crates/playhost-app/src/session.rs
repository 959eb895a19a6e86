//! Play session lifecycle
//!
//! A [`Session`] is created once per play attempt. It sits between the host
//! UI and the engine: host lifecycle events come in through `on_*` methods,
//! engine notifications come in through [`crate::callbacks`], and the only
//! outbound traffic is synthesized input and UI commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::{MenuSettingsHandle, SettingsStore};
use crate::cursor::CursorState;
use crate::host::{CrashReporter, Terminator};
use crate::log_capture::LogCapture;
use crate::synth::{EngineLink, KeySynthesizer};
use crate::ui::{UiCommand, UiDispatcher};
use playhost_core::prelude::*;
use playhost_core::{
    CursorMode, ExitKind, InteractionMode, MouseButton, MouseEvent, SessionPhase,
};
use playhost_engine::{DeviceClassifier, EngineHandle};

/// Collaborators a session is built from
pub struct SessionDeps {
    pub ui: UiDispatcher,
    pub classifier: DeviceClassifier,
    pub settings_store: SettingsStore,
    pub crash_reporter: Arc<dyn CrashReporter>,
    pub terminator: Arc<dyn Terminator>,
}

/// One play attempt, from setup to engine exit
pub struct Session {
    phase: Mutex<SessionPhase>,
    simulated: AtomicBool,
    overlay_removed: AtomicBool,
    link: Arc<EngineLink>,
    synth: KeySynthesizer,
    cursor: CursorState,
    log_capture: LogCapture,
    menu_settings: OnceLock<MenuSettingsHandle>,
    ui: UiDispatcher,
    classifier: DeviceClassifier,
    settings_store: SettingsStore,
    crash_reporter: Arc<dyn CrashReporter>,
    terminator: Arc<dyn Terminator>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase())
            .field("simulated", &self.is_simulated())
            .field("cursor_mode", &self.cursor.cursor_mode())
            .field("settings", &self.settings_store.path())
            .finish()
    }
}

impl Session {
    pub fn new(deps: SessionDeps) -> Arc<Self> {
        let link = Arc::new(EngineLink::default());
        Arc::new(Self {
            phase: Mutex::new(SessionPhase::Created),
            simulated: AtomicBool::new(false),
            overlay_removed: AtomicBool::new(false),
            synth: KeySynthesizer::new(Arc::clone(&link)),
            link,
            cursor: CursorState::new(deps.ui.clone()),
            log_capture: LogCapture::detached(),
            menu_settings: OnceLock::new(),
            ui: deps.ui,
            classifier: deps.classifier,
            settings_store: deps.settings_store,
            crash_reporter: deps.crash_reporter,
            terminator: deps.terminator,
        })
    }

    fn lock_phase(&self) -> MutexGuard<'_, SessionPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring the session up. `None` starts a simulated session with no engine.
    ///
    /// Loads menu settings and keeps them persisted, routes engine logs to
    /// the engine's log path, and shows the progress overlay until the
    /// first frame. Fails if the session was already set up.
    pub fn setup(&self, engine: Option<Arc<dyn EngineHandle>>) -> Result<()> {
        let mut phase = self.lock_phase();
        if *phase != SessionPhase::Created {
            return Err(Error::session_state(format!(
                "setup called on a session in the {:?} phase",
                *phase
            )));
        }

        let settings = MenuSettingsHandle::new(self.settings_store.load());
        settings.persist_to(self.settings_store.clone());
        // Only reachable once, guarded by the phase check
        let _ = self.menu_settings.set(settings);

        match engine {
            Some(engine) => {
                self.log_capture.attach(engine.log_path());
                self.link.attach(engine);
                self.ui.post(UiCommand::ShowProgressOverlay);
                info!("Session started with live engine");
            }
            None => {
                self.simulated.store(true, Ordering::SeqCst);
                info!("Session started in simulated mode");
            }
        }

        *phase = SessionPhase::Active;
        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        *self.lock_phase()
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated.load(Ordering::SeqCst)
    }

    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    pub fn log_capture(&self) -> &LogCapture {
        &self.log_capture
    }

    /// Settings loaded at setup; `None` before setup
    pub fn menu_settings(&self) -> Option<&MenuSettingsHandle> {
        self.menu_settings.get()
    }

    fn ensure_active(&self, operation: &str) -> bool {
        let phase = self.phase();
        if !phase.is_active() {
            debug!("Ignoring {} in {:?} phase", operation, phase);
        }
        phase.is_active()
    }

    /// Host lost focus. Releases a captured cursor by sending escape.
    pub fn on_pause(&self) {
        if !self.ensure_active("pause") {
            return;
        }
        if self.cursor.cursor_mode() == CursorMode::Disabled {
            self.synth.synthesize_escape();
        }
    }

    pub fn on_resume(&self) {
        if self.ensure_active("resume") {
            trace!("Session resumed");
        }
    }

    /// Operator pressed "back". Without a real pointer there is no other
    /// way to reach the game's escape menu, so escape is sent.
    pub fn on_back_pressed(&self) {
        if !self.ensure_active("back") {
            return;
        }
        match self.classifier.classify_interaction_mode() {
            InteractionMode::TouchDriven => self.synth.synthesize_escape(),
            InteractionMode::PointerDriven => {
                debug!("Pointer attached, back press left to the pointer device")
            }
        }
    }

    /// First frame rendered; the progress overlay goes away
    pub fn on_graphic_output(&self) {
        if !self.ensure_active("graphic output") {
            return;
        }
        if !self.overlay_removed.swap(true, Ordering::SeqCst) {
            self.ui.post(UiCommand::RemoveProgressOverlay);
        }
    }

    pub fn on_cursor_mode_change(&self, mode: CursorMode) {
        if self.ensure_active("cursor mode change") {
            self.cursor.apply_cursor_mode_change(mode);
        }
    }

    pub fn on_log(&self, line: &str) {
        if self.ensure_active("log line") {
            self.log_capture.capture_log_line(line);
        }
    }

    /// Operator moved the pointer to `(x, y)` in device space.
    ///
    /// The cursor follows only while it is enabled.
    pub fn move_pointer(&self, x: i32, y: i32) {
        if !self.ensure_active("pointer move") {
            return;
        }
        self.cursor.set_pointer_pos(x, y);
        if self.cursor.cursor_mode() == CursorMode::Enabled {
            self.cursor.set_cursor_pos(x, y);
        }
        self.synth.send_mouse(MouseEvent::Move { x, y });
    }

    /// Operator pressed or released a pointer button
    pub fn press_pointer_button(&self, button: MouseButton, down: bool) {
        if self.ensure_active("pointer button") {
            self.synth.send_mouse(MouseEvent::Button { button, down });
        }
    }

    /// Operator scrolled by `(dx, dy)` notches
    pub fn scroll_pointer(&self, dx: i32, dy: i32) {
        if self.ensure_active("scroll") {
            self.synth.send_mouse(MouseEvent::Scroll { dx, dy });
        }
    }

    /// The engine exited with `code`. Ends the session and the host.
    ///
    /// Only the first call has any effect. An exit that arrives before
    /// setup still ends the host, since no engine is left to serve it.
    pub fn on_exit(&self, code: i32) {
        {
            let mut phase = self.lock_phase();
            if *phase == SessionPhase::Exited {
                debug!("Ignoring repeated exit code {}", code);
                return;
            }
            if *phase == SessionPhase::Created {
                warn!("Engine exited before session setup");
            }
            *phase = SessionPhase::Exited;
        }

        let kind = ExitKind::from_code(code);
        info!("Engine exited with code {} ({:?})", code, kind);

        self.log_capture.close();
        self.link.detach();

        if kind.is_crash() {
            let log_path = self.log_capture.target();
            self.crash_reporter
                .show_crash_report(code, log_path.as_deref());
        }

        self.terminator.terminate(code);
    }
}
