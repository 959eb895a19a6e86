//! Capture of engine log output to a file
//!
//! The first line written in a session truncates the target; every later
//! line appends. All writes go through one mutex, so lines from concurrent
//! callbacks never interleave and the first/append decision is made once.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use playhost_core::prelude::*;

#[derive(Debug, Default)]
struct CaptureState {
    /// Destination file; `None` when there is no live engine
    target: Option<PathBuf>,
    /// Set after the first line lands in the file
    first_written: bool,
    /// Open handle for appends
    file: Option<File>,
    /// Set on engine exit; later lines are dropped
    closed: bool,
}

/// Best-effort serializer of engine log lines
#[derive(Debug, Default)]
pub struct LogCapture {
    state: Mutex<CaptureState>,
}

impl LogCapture {
    /// A capture that drops everything until a target is attached
    pub fn detached() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route future lines to `target`
    pub fn attach(&self, target: impl Into<PathBuf>) {
        let mut state = self.lock();
        let target = target.into();
        debug!("Capturing engine log to {}", target.display());
        state.target = Some(target);
    }

    pub fn target(&self) -> Option<PathBuf> {
        self.lock().target.clone()
    }

    pub fn first_log_written(&self) -> bool {
        self.lock().first_written
    }

    /// Write one engine log line. Failures are logged, never returned.
    pub fn capture_log_line(&self, line: &str) {
        let mut state = self.lock();
        if state.closed {
            trace!("Log capture closed, dropping line");
            return;
        }
        let Some(target) = state.target.clone() else {
            return;
        };

        if let Err(e) = write_line(&mut state, &target, line) {
            warn!(
                "Can't write engine log to {}: {}",
                target.display(),
                e
            );
            // Reopen on the next line
            state.file = None;
        }
    }

    /// Stop capturing.
    ///
    /// Blocks until an in-flight write finishes, then releases the file.
    pub fn close(&self) {
        let mut state = self.lock();
        if let Some(mut file) = state.file.take() {
            if let Err(e) = file.flush() {
                warn!("Failed to flush engine log on close: {}", e);
            }
        }
        state.closed = true;
        debug!("Log capture closed");
    }
}

fn write_line(state: &mut CaptureState, target: &Path, line: &str) -> Result<()> {
    if !state.first_written {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(target)?;
        file.write_all(format!("{}\n", line).as_bytes())?;
        file.flush()?;
        state.file = Some(file);
        state.first_written = true;
        return Ok(());
    }

    if state.file.is_none() {
        let file = OpenOptions::new().create(true).append(true).open(target)?;
        state.file = Some(file);
    }

    if let Some(file) = state.file.as_mut() {
        file.write_all(format!("{}\n", line).as_bytes())?;
        file.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_first_line_truncates_then_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest.log");
        std::fs::write(&path, "stale content from a previous run\n").unwrap();

        let capture = LogCapture::detached();
        capture.attach(&path);
        assert!(!capture.first_log_written());

        capture.capture_log_line("A");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A\n");
        assert!(capture.first_log_written());

        capture.capture_log_line("B");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A\nB\n");
    }

    #[test]
    fn test_detached_capture_writes_nothing() {
        let capture = LogCapture::detached();
        capture.capture_log_line("ignored");
        assert!(!capture.first_log_written());
        assert_eq!(capture.target(), None);
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("game").join("latest.log");

        let capture = LogCapture::detached();
        capture.attach(&path);
        capture.capture_log_line("hello");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_failed_first_write_is_retried_as_first() {
        let dir = tempdir().unwrap();
        // A directory in place of the file makes the open fail
        let path = dir.path().join("latest.log");
        std::fs::create_dir(&path).unwrap();

        let capture = LogCapture::detached();
        capture.attach(&path);
        capture.capture_log_line("lost");
        assert!(!capture.first_log_written());

        std::fs::remove_dir(&path).unwrap();
        capture.capture_log_line("kept");
        assert!(capture.first_log_written());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn test_close_drops_later_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest.log");

        let capture = LogCapture::detached();
        capture.attach(&path);
        capture.capture_log_line("before");
        capture.close();
        capture.capture_log_line("after");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "before\n");
    }

    #[test]
    fn test_concurrent_lines_are_not_interleaved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest.log");

        let capture = Arc::new(LogCapture::detached());
        capture.attach(&path);

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let capture = Arc::clone(&capture);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        capture.capture_log_line(&format!("thread-{}-line-{:03}", t, i));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1000);
        assert!(lines.iter().all(|l| l.starts_with("thread-") && l.len() == 17));

        // Per-thread order is preserved
        for t in 0..4 {
            let prefix = format!("thread-{}-", t);
            let own: Vec<&&str> = lines.iter().filter(|l| l.starts_with(&prefix)).collect();
            assert_eq!(own.len(), 250);
            assert!(own.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
