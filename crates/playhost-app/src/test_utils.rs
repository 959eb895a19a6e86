//! Test utilities for session-level tests
//!
//! Recording implementations of the host traits and a session builder
//! wired to a static device list.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::host::{CrashReporter, HostUi, Terminator};
use crate::session::{Session, SessionDeps};
use crate::ui::{ui_channel, UiCommand, UiQueue};
use crate::config::SettingsStore;
use playhost_engine::{ClassifierPolicy, DeviceClassifier, StaticDeviceSource};

/// Host UI that records every applied command
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<UiCommand>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<UiCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Visibility from the most recent cursor command
    pub fn cursor_visible(&self) -> Option<bool> {
        self.calls().into_iter().rev().find_map(|c| match c {
            UiCommand::SetCursorVisible(visible) => Some(visible),
            _ => None,
        })
    }
}

impl HostUi for RecordingHost {
    fn set_cursor_visible(&self, visible: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(UiCommand::SetCursorVisible(visible));
    }

    fn show_progress_overlay(&self) {
        self.calls.lock().unwrap().push(UiCommand::ShowProgressOverlay);
    }

    fn remove_progress_overlay(&self) {
        self.calls
            .lock()
            .unwrap()
            .push(UiCommand::RemoveProgressOverlay);
    }
}

/// Crash reporter that records `(exit_code, log_path)` pairs
#[derive(Debug, Default)]
pub struct RecordingCrashReporter {
    reports: Mutex<Vec<(i32, Option<PathBuf>)>>,
}

impl RecordingCrashReporter {
    pub fn reports(&self) -> Vec<(i32, Option<PathBuf>)> {
        self.reports.lock().unwrap().clone()
    }
}

impl CrashReporter for RecordingCrashReporter {
    fn show_crash_report(&self, exit_code: i32, log_path: Option<&Path>) {
        self.reports
            .lock()
            .unwrap()
            .push((exit_code, log_path.map(Path::to_path_buf)));
    }
}

/// Terminator that records exit codes instead of exiting
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, exit_code: i32) {
        self.codes.lock().unwrap().push(exit_code);
    }
}

/// A session with recording collaborators, not yet set up
pub struct TestSession {
    pub session: Arc<Session>,
    pub queue: UiQueue,
    pub host: RecordingHost,
    pub devices: Arc<StaticDeviceSource>,
    pub crash_reporter: Arc<RecordingCrashReporter>,
    pub terminator: Arc<RecordingTerminator>,
}

impl TestSession {
    /// Build a session that persists settings at `settings_path`
    pub fn new(settings_path: impl AsRef<Path>) -> Self {
        let (ui, queue) = ui_channel();
        let devices = Arc::new(StaticDeviceSource::empty());
        let crash_reporter = Arc::new(RecordingCrashReporter::default());
        let terminator = Arc::new(RecordingTerminator::default());

        let session = Session::new(SessionDeps {
            ui,
            classifier: DeviceClassifier::new(devices.clone(), ClassifierPolicy::default()),
            settings_store: SettingsStore::new(settings_path.as_ref()),
            crash_reporter: crash_reporter.clone(),
            terminator: terminator.clone(),
        });

        Self {
            session,
            queue,
            host: RecordingHost::default(),
            devices,
            crash_reporter,
            terminator,
        }
    }

    /// Apply everything posted to the UI so far to [`Self::host`]
    pub fn drain_ui(&mut self) -> usize {
        self.queue.drain(&self.host)
    }
}
