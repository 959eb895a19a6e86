//! playhost Library
//!
//! Headless host for running an engine session from the command line.

pub mod headless;

pub use headless::runner::{report_devices, run_headless, HeadlessOptions};
