//! Test utilities for engine types
//!
//! Provides a recording engine handle and helpers for building devices.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::devices::InputDevice;
use super::handle::EngineHandle;
use playhost_core::prelude::*;
use playhost_core::{KeyCode, MouseEvent};

/// Something the host sent to a [`RecordingEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentInput {
    Key { code: KeyCode, down: bool },
    Mouse(MouseEvent),
}

/// Engine handle that records everything sent to it, in order.
#[derive(Debug)]
pub struct RecordingEngine {
    log_path: PathBuf,
    sent: Mutex<Vec<SentInput>>,
    reject: AtomicBool,
}

impl RecordingEngine {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            sent: Mutex::new(Vec::new()),
            reject: AtomicBool::new(false),
        }
    }

    /// Make every subsequent send fail with [`Error::EngineDetached`]
    pub fn reject_input(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentInput> {
        self.sent.lock().unwrap().clone()
    }

    /// Only the key events, as `(code, down)` pairs
    pub fn sent_keys(&self) -> Vec<(KeyCode, bool)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                SentInput::Key { code, down } => Some((code, down)),
                SentInput::Mouse(_) => None,
            })
            .collect()
    }

    fn record(&self, input: SentInput) -> Result<()> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::EngineDetached);
        }
        self.sent.lock().unwrap().push(input);
        Ok(())
    }
}

impl EngineHandle for RecordingEngine {
    fn send_key_event(&self, code: KeyCode, is_down: bool) -> Result<()> {
        self.record(SentInput::Key {
            code,
            down: is_down,
        })
    }

    fn send_mouse_event(&self, event: MouseEvent) -> Result<()> {
        self.record(SentInput::Mouse(event))
    }

    fn log_path(&self) -> PathBuf {
        self.log_path.clone()
    }
}

/// An external, physical mouse
pub fn test_mouse(id: u32) -> InputDevice {
    InputDevice::new(id, format!("USB Optical Mouse {}", id)).with_external(true)
}

/// A built-in touchscreen
pub fn test_touchscreen(id: u32) -> InputDevice {
    InputDevice::new(id, "touchscreen")
}
