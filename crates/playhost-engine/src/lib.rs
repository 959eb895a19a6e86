//! # playhost-engine - Engine Bridge
//!
//! Contracts for talking to an embedded game engine, a process-backed
//! implementation of them, and input device enumeration.
//!
//! Depends on [`playhost_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Engine Contracts
//! - [`EngineHandle`] - Outbound capability: key/mouse input, log path
//! - [`EngineCallbacks`] - Inbound notifications: cursor mode, log, exit
//! - [`dispatch_event()`] - Route an [`EngineEvent`](playhost_core::EngineEvent) to callbacks
//!
//! ### Process Engine
//! - [`ProcessEngine`] - Launch an engine executable and bridge its stdio
//! - [`EngineLaunchConfig`] - Executable, arguments, log path
//!
//! ### Protocol
//! - [`parse_engine_line()`] - Parse one line of engine output
//! - [`encode_key_event()`], [`encode_mouse_event()`] - Encode host input
//!
//! ### Devices
//! - [`InputDevice`] - One attached device at query time
//! - [`DeviceSource`] - Snapshot provider ([`ProcInputDevices`], [`StaticDeviceSource`])
//! - [`DeviceClassifier`] - Pointer vs touch classification

pub mod classifier;
pub mod devices;
pub mod handle;
pub mod process;
pub mod protocol;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use classifier::{
    CharInputSurface, ClassifierPolicy, DeviceClassifier, DEFAULT_POINTER_TOKENS,
    EXTERNAL_FLAG_MIN_LEVEL,
};
pub use devices::{
    parse_proc_input_devices, DeviceSource, InputDevice, ProcInputDevices, StaticDeviceSource,
};
#[cfg(any(test, feature = "test-helpers"))]
pub use handle::MockEngineHandle;
pub use handle::{dispatch_event, EngineCallbacks, EngineHandle};
pub use process::{EngineLaunchConfig, ProcessEngine};
pub use protocol::{encode_key_event, encode_mouse_event, parse_engine_line};
