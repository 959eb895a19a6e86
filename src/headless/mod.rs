//! Headless mode - NDJSON host events on stdout
//!
//! Stands in for a graphical host: UI commands, crash reports and session
//! milestones are written to stdout as newline-delimited JSON, and operator
//! input is read from stdin (see [`runner`]).
//!
//! # Example Output
//!
//! ```json
//! {"event":"session_started","simulated":false,"log_path":"/tmp/latest.log","timestamp":1704700001000}
//! {"event":"progress_overlay","visible":true,"timestamp":1704700001001}
//! {"event":"cursor_visibility","visible":false,"timestamp":1704700004000}
//! {"event":"crash_report","exit_code":137,"log_path":"/tmp/latest.log","log_tail":["..."],"timestamp":1704700009000}
//! ```

pub mod commands;
pub mod runner;

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;

use tracing::{error, warn};

use playhost_app::{CrashReporter, HostUi, ProcessTerminator, Terminator};
use playhost_core::{InteractionMode, Result};
use playhost_engine::InputDevice;

/// Lines of engine log included in a crash report
pub const CRASH_LOG_TAIL_LINES: usize = 20;

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Session set up and, for a live session, engine spawned
    SessionStarted {
        simulated: bool,
        log_path: Option<String>,
        timestamp: i64,
    },

    /// Host cursor indicator shown or hidden
    CursorVisibility { visible: bool, timestamp: i64 },

    /// Startup progress overlay shown or removed
    ProgressOverlay { visible: bool, timestamp: i64 },

    /// Engine ended abnormally
    CrashReport {
        exit_code: i32,
        log_path: Option<String>,
        log_tail: Vec<String>,
        timestamp: i64,
    },

    /// Host is about to terminate
    Exiting { exit_code: i32, timestamp: i64 },

    /// Input device seen during enumeration
    DeviceDetected {
        id: u32,
        name: String,
        is_virtual: bool,
        is_external: bool,
        timestamp: i64,
    },

    /// Result of classifying the attached devices
    InteractionMode { mode: String, timestamp: i64 },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Flush to ensure immediate output
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn session_started(simulated: bool, log_path: Option<&Path>) -> Self {
        Self::SessionStarted {
            simulated,
            log_path: log_path.map(|p| p.display().to_string()),
            timestamp: Self::now(),
        }
    }

    pub fn cursor_visibility(visible: bool) -> Self {
        Self::CursorVisibility {
            visible,
            timestamp: Self::now(),
        }
    }

    pub fn progress_overlay(visible: bool) -> Self {
        Self::ProgressOverlay {
            visible,
            timestamp: Self::now(),
        }
    }

    pub fn crash_report(exit_code: i32, log_path: Option<&Path>, log_tail: Vec<String>) -> Self {
        Self::CrashReport {
            exit_code,
            log_path: log_path.map(|p| p.display().to_string()),
            log_tail,
            timestamp: Self::now(),
        }
    }

    pub fn exiting(exit_code: i32) -> Self {
        Self::Exiting {
            exit_code,
            timestamp: Self::now(),
        }
    }

    pub fn device_detected(device: &InputDevice) -> Self {
        Self::DeviceDetected {
            id: device.id,
            name: device.name.clone(),
            is_virtual: device.is_virtual,
            is_external: device.is_external,
            timestamp: Self::now(),
        }
    }

    pub fn interaction_mode(mode: InteractionMode) -> Self {
        let mode = match mode {
            InteractionMode::PointerDriven => "pointer_driven",
            InteractionMode::TouchDriven => "touch_driven",
        };
        Self::InteractionMode {
            mode: mode.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}

/// Host UI that reports presentation changes as events
#[derive(Debug, Default)]
pub struct HeadlessHost;

impl HostUi for HeadlessHost {
    fn set_cursor_visible(&self, visible: bool) {
        HeadlessEvent::cursor_visibility(visible).emit();
    }

    fn show_progress_overlay(&self) {
        HeadlessEvent::progress_overlay(true).emit();
    }

    fn remove_progress_overlay(&self) {
        HeadlessEvent::progress_overlay(false).emit();
    }
}

/// Crash reporter that emits the tail of the engine log
#[derive(Debug, Clone)]
pub struct LogTailCrashReporter {
    tail_lines: usize,
}

impl Default for LogTailCrashReporter {
    fn default() -> Self {
        Self {
            tail_lines: CRASH_LOG_TAIL_LINES,
        }
    }
}

impl CrashReporter for LogTailCrashReporter {
    fn show_crash_report(&self, exit_code: i32, log_path: Option<&Path>) {
        let tail = match log_path {
            Some(path) => read_log_tail(path, self.tail_lines).unwrap_or_else(|e| {
                warn!("Could not read engine log for crash report: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        HeadlessEvent::crash_report(exit_code, log_path, tail).emit();
    }
}

/// Hands the engine's exit code to the runner.
///
/// The runner still owns the UI queue, so it flushes pending UI events
/// before the process ends. Without a runner the process is terminated
/// directly.
#[derive(Debug, Clone)]
pub struct HeadlessTerminator {
    exit_tx: mpsc::UnboundedSender<i32>,
}

impl HeadlessTerminator {
    pub fn new(exit_tx: mpsc::UnboundedSender<i32>) -> Self {
        Self { exit_tx }
    }
}

impl Terminator for HeadlessTerminator {
    fn terminate(&self, exit_code: i32) {
        if self.exit_tx.send(exit_code).is_err() {
            warn!("Headless runner gone, exiting directly");
            HeadlessEvent::exiting(exit_code).emit();
            ProcessTerminator.terminate(exit_code);
        }
    }
}

/// Last `max_lines` lines of the file at `path`
pub fn read_log_tail(path: &Path, max_lines: usize) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let mut tail = VecDeque::with_capacity(max_lines);
    for line in io::BufReader::new(file).lines() {
        if tail.len() == max_lines {
            tail.pop_front();
        }
        if max_lines > 0 {
            tail.push_back(line?);
        }
    }
    Ok(tail.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_crash_report_serialization() {
        let event = HeadlessEvent::crash_report(
            137,
            Some(Path::new("/tmp/latest.log")),
            vec!["Exception in thread main".to_string()],
        );
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "crash_report");
        assert_eq!(value["exit_code"], 137);
        assert_eq!(value["log_path"], "/tmp/latest.log");
        assert_eq!(value["log_tail"][0], "Exception in thread main");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_cursor_visibility_serialization() {
        let event = HeadlessEvent::cursor_visibility(false);
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "cursor_visibility");
        assert_eq!(value["visible"], false);
    }

    #[test]
    fn test_device_detected_serialization() {
        let device = InputDevice::new(4, "Logitech USB Mouse").with_external(true);
        let json = serde_json::to_string(&HeadlessEvent::device_detected(&device))
            .expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "device_detected");
        assert_eq!(value["id"], 4);
        assert_eq!(value["name"], "Logitech USB Mouse");
        assert_eq!(value["is_virtual"], false);
        assert_eq!(value["is_external"], true);
    }

    #[test]
    fn test_interaction_mode_serialization() {
        let json =
            serde_json::to_string(&HeadlessEvent::interaction_mode(InteractionMode::TouchDriven))
                .expect("serialization failed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");
        assert_eq!(value["mode"], "touch_driven");
    }

    #[test]
    fn test_read_log_tail_keeps_last_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest.log");
        let content: String = (1..=30).map(|i| format!("line {}\n", i)).collect();
        std::fs::write(&path, content).unwrap();

        let tail = read_log_tail(&path, 3).unwrap();
        assert_eq!(tail, vec!["line 28", "line 29", "line 30"]);
    }

    #[test]
    fn test_read_log_tail_short_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest.log");
        std::fs::write(&path, "only\n").unwrap();

        assert_eq!(read_log_tail(&path, 20).unwrap(), vec!["only"]);
    }

    #[test]
    fn test_read_log_tail_missing_file() {
        let dir = tempdir().unwrap();
        assert!(read_log_tail(&dir.path().join("nope.log"), 5).is_err());
    }

    #[test]
    fn test_terminator_hands_exit_to_runner() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        HeadlessTerminator::new(tx).terminate(137);
        assert_eq!(rx.try_recv().unwrap(), 137);
    }
}
