//! Input device enumeration
//!
//! A [`DeviceSource`] produces a fresh snapshot of attached input devices on
//! every call. Nothing here caches: devices come and go during a session.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use regex::Regex;
use serde::Serialize;

use playhost_core::prelude::*;

/// Kernel listing of input devices on Linux
pub const PROC_INPUT_DEVICES: &str = "/proc/bus/input/devices";

/// Bus ids reported for devices plugged into the host (USB, Bluetooth)
const EXTERNAL_BUS_IDS: &[u16] = &[0x0003, 0x0005];

static BUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bus=([0-9a-fA-F]{4})").expect("valid bus regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^N: Name="(.*)"\s*$"#).expect("valid name regex"));

static SYSFS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S: Sysfs=(\S+)").expect("valid sysfs regex"));

/// One attached input device, as seen at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDevice {
    /// Platform device id
    pub id: u32,

    /// Declared device name
    pub name: String,

    /// Software-only device (no physical hardware behind it)
    pub is_virtual: bool,

    /// Plugged into the host rather than built in
    pub is_external: bool,
}

impl InputDevice {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_virtual: false,
            is_external: false,
        }
    }

    pub fn with_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }

    pub fn with_external(mut self, is_external: bool) -> Self {
        self.is_external = is_external;
        self
    }
}

/// Source of input device snapshots
pub trait DeviceSource: Send + Sync {
    /// Enumerate currently attached devices
    fn snapshot(&self) -> Result<Vec<InputDevice>>;

    /// Legacy platform level, if the platform has one.
    ///
    /// Older platform levels do not report the external flag reliably. `None`
    /// means the flag is always trustworthy.
    fn platform_level(&self) -> Option<u32> {
        None
    }
}

// ─────────────────────────────────────────────────────────
// Static Source
// ─────────────────────────────────────────────────────────

/// Device source backed by an in-memory list.
///
/// The list can be replaced at any time to model hot-plugging.
#[derive(Debug, Default)]
pub struct StaticDeviceSource {
    devices: Mutex<Vec<InputDevice>>,
    platform_level: Option<u32>,
}

impl StaticDeviceSource {
    pub fn new(devices: Vec<InputDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            platform_level: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_platform_level(mut self, level: u32) -> Self {
        self.platform_level = Some(level);
        self
    }

    /// Replace the attached devices
    pub fn set_devices(&self, devices: Vec<InputDevice>) {
        if let Ok(mut slot) = self.devices.lock() {
            *slot = devices;
        }
    }
}

impl DeviceSource for StaticDeviceSource {
    fn snapshot(&self) -> Result<Vec<InputDevice>> {
        self.devices
            .lock()
            .map(|devices| devices.clone())
            .map_err(|_| Error::device_enumeration("device list lock poisoned"))
    }

    fn platform_level(&self) -> Option<u32> {
        self.platform_level
    }
}

// ─────────────────────────────────────────────────────────
// Linux Source
// ─────────────────────────────────────────────────────────

/// Device source reading the kernel's input device listing
#[derive(Debug, Clone)]
pub struct ProcInputDevices {
    path: PathBuf,
}

impl Default for ProcInputDevices {
    fn default() -> Self {
        Self::new(PROC_INPUT_DEVICES)
    }
}

impl ProcInputDevices {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceSource for ProcInputDevices {
    fn snapshot(&self) -> Result<Vec<InputDevice>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::device_enumeration(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let devices = parse_proc_input_devices(&content);
        debug!("Enumerated {} input devices", devices.len());
        Ok(devices)
    }
}

/// Parse the contents of `/proc/bus/input/devices`.
///
/// Devices are blank-line separated blocks. A device is virtual when its
/// sysfs node lives under `/devices/virtual`, and external when it sits on
/// a USB or Bluetooth bus. Blocks without a name are skipped.
pub fn parse_proc_input_devices(content: &str) -> Vec<InputDevice> {
    let mut devices = Vec::new();

    for (index, block) in content.split("\n\n").enumerate() {
        let mut name = None;
        let mut bus = None;
        let mut sysfs = None;

        for line in block.lines() {
            let line = line.trim_end();
            if line.starts_with("I:") {
                bus = BUS_RE
                    .captures(line)
                    .and_then(|c| u16::from_str_radix(&c[1], 16).ok());
            } else if let Some(caps) = NAME_RE.captures(line) {
                name = Some(caps[1].to_string());
            } else if let Some(caps) = SYSFS_RE.captures(line) {
                sysfs = Some(caps[1].to_string());
            }
        }

        let Some(name) = name else {
            continue;
        };

        let id = sysfs
            .as_deref()
            .and_then(input_number)
            .unwrap_or(index as u32);
        let is_virtual = sysfs
            .as_deref()
            .map(|path| path.starts_with("/devices/virtual/"))
            .unwrap_or(false);
        let is_external = bus.map(|b| EXTERNAL_BUS_IDS.contains(&b)).unwrap_or(false);

        trace!(
            "Input device {}: {:?} virtual={} external={}",
            id,
            name,
            is_virtual,
            is_external
        );

        devices.push(InputDevice {
            id,
            name,
            is_virtual,
            is_external,
        });
    }

    devices
}

/// Extract `N` from a sysfs path ending in `/inputN`
fn input_number(sysfs: &str) -> Option<u32> {
    sysfs
        .rsplit('/')
        .next()
        .and_then(|last| last.strip_prefix("input"))
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"I: Bus=0019 Vendor=0000 Product=0001 Version=0000
N: Name="Power Button"
P: Phys=PNP0C0C/button/input0
S: Sysfs=/devices/LNXSYSTM:00/LNXPWRBN:00/input/input0
U: Uniq=
H: Handlers=kbd event0
B: PROP=0
B: EV=3

I: Bus=0003 Vendor=046d Product=c077 Version=0111
N: Name="Logitech USB Optical Mouse"
P: Phys=usb-0000:00:14.0-2/input0
S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-2/1-2:1.0/0003:046D:C077.0001/input/input12
U: Uniq=
H: Handlers=mouse0 event5
B: PROP=0
B: EV=17

I: Bus=0006 Vendor=0000 Product=0000 Version=0000
N: Name="Virtual Mouse"
P: Phys=
S: Sysfs=/devices/virtual/input/input20
U: Uniq=
H: Handlers=mouse1 event9
"#;

    #[test]
    fn test_parse_proc_input_devices() {
        let devices = parse_proc_input_devices(SAMPLE);
        assert_eq!(devices.len(), 3);

        assert_eq!(devices[0].id, 0);
        assert_eq!(devices[0].name, "Power Button");
        assert!(!devices[0].is_virtual);
        assert!(!devices[0].is_external);

        assert_eq!(devices[1].id, 12);
        assert_eq!(devices[1].name, "Logitech USB Optical Mouse");
        assert!(devices[1].is_external);
        assert!(!devices[1].is_virtual);

        assert_eq!(devices[2].id, 20);
        assert!(devices[2].is_virtual);
        assert!(!devices[2].is_external);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_proc_input_devices("").is_empty());
        assert!(parse_proc_input_devices("\n\n\n").is_empty());
    }

    #[test]
    fn test_block_without_name_is_skipped() {
        let content = "I: Bus=0003 Vendor=0000 Product=0000 Version=0000\nS: Sysfs=/devices/x/input/input3\n";
        assert!(parse_proc_input_devices(content).is_empty());
    }

    #[test]
    fn test_input_number() {
        assert_eq!(input_number("/devices/virtual/input/input20"), Some(20));
        assert_eq!(input_number("/devices/virtual/input/mice"), None);
    }

    #[test]
    fn test_proc_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices");
        std::fs::write(&path, SAMPLE).unwrap();

        let source = ProcInputDevices::new(&path);
        assert_eq!(source.snapshot().unwrap().len(), 3);
        assert_eq!(source.platform_level(), None);
    }

    #[test]
    fn test_proc_source_missing_file_is_error() {
        let source = ProcInputDevices::new("/nonexistent/playhost/devices");
        let err = source.snapshot().unwrap_err();
        assert!(matches!(err, Error::DeviceEnumeration { .. }));
    }

    #[test]
    fn test_static_source_hot_plug() {
        let source = StaticDeviceSource::empty();
        assert!(source.snapshot().unwrap().is_empty());

        source.set_devices(vec![InputDevice::new(7, "USB Mouse").with_external(true)]);
        let devices = source.snapshot().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "USB Mouse");
    }
}
