//! Interaction mode classification
//!
//! Decides whether the operator is using a real pointing device or touch,
//! from a device snapshot taken at decision time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::devices::{DeviceSource, InputDevice};
use playhost_core::prelude::*;
use playhost_core::InteractionMode;

/// Name fragments that mark a device as a pointer
pub const DEFAULT_POINTER_TOKENS: &[&str] = &["Mouse"];

/// First platform level whose external-device flag can be trusted
pub const EXTERNAL_FLAG_MIN_LEVEL: u32 = 29;

/// Tunables for pointer detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierPolicy {
    /// Case-sensitive substrings of a device name that mark it as a pointer
    #[serde(default = "default_pointer_tokens")]
    pub pointer_tokens: Vec<String>,

    /// Platform levels below this ignore the external flag
    #[serde(default = "default_external_flag_min_level")]
    pub external_flag_min_level: u32,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            pointer_tokens: default_pointer_tokens(),
            external_flag_min_level: default_external_flag_min_level(),
        }
    }
}

fn default_pointer_tokens() -> Vec<String> {
    DEFAULT_POINTER_TOKENS.iter().map(|t| t.to_string()).collect()
}

fn default_external_flag_min_level() -> u32 {
    EXTERNAL_FLAG_MIN_LEVEL
}

impl ClassifierPolicy {
    pub fn name_is_pointer(&self, name: &str) -> bool {
        self.pointer_tokens
            .iter()
            .any(|token| !token.is_empty() && name.contains(token.as_str()))
    }

    /// Whether `device` counts as a real pointer.
    ///
    /// Non-virtual, AND (pointer-like name OR character input disabled), AND
    /// (legacy platform OR external device).
    pub fn is_real_pointer(
        &self,
        device: &InputDevice,
        platform_level: Option<u32>,
        char_input_disabled: bool,
    ) -> bool {
        if device.is_virtual {
            return false;
        }
        if !(self.name_is_pointer(&device.name) || char_input_disabled) {
            return false;
        }
        let legacy_platform = platform_level
            .map(|level| level < self.external_flag_min_level)
            .unwrap_or(false);
        legacy_platform || device.is_external
    }

    /// Classify a snapshot
    pub fn classify(
        &self,
        devices: &[InputDevice],
        platform_level: Option<u32>,
        char_input_disabled: bool,
    ) -> InteractionMode {
        let pointer = devices
            .iter()
            .find(|d| self.is_real_pointer(d, platform_level, char_input_disabled));

        match pointer {
            Some(device) => {
                debug!("Pointer device present: {} ({})", device.name, device.id);
                InteractionMode::PointerDriven
            }
            None => InteractionMode::TouchDriven,
        }
    }
}

/// State of the host's character-input surface (soft keyboard bridge)
pub trait CharInputSurface: Send + Sync {
    fn is_enabled(&self) -> bool;
}

/// Classifies interaction mode from live device enumeration
#[derive(Clone)]
pub struct DeviceClassifier {
    source: Arc<dyn DeviceSource>,
    char_input: Option<Arc<dyn CharInputSurface>>,
    policy: ClassifierPolicy,
}

impl std::fmt::Debug for DeviceClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceClassifier")
            .field("has_char_input", &self.char_input.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl DeviceClassifier {
    pub fn new(source: Arc<dyn DeviceSource>, policy: ClassifierPolicy) -> Self {
        Self {
            source,
            char_input: None,
            policy,
        }
    }

    /// Consider the character-input surface. A disabled surface makes any
    /// physical external device count as a pointer.
    pub fn with_char_input(mut self, char_input: Arc<dyn CharInputSurface>) -> Self {
        self.char_input = Some(char_input);
        self
    }

    pub fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    /// Enumerate devices now and classify.
    ///
    /// Enumeration failure is treated as "no devices", i.e. touch-driven.
    pub fn classify_interaction_mode(&self) -> InteractionMode {
        let devices = match self.source.snapshot() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Input device enumeration failed, assuming touch: {}", e);
                Vec::new()
            }
        };

        let char_input_disabled = self
            .char_input
            .as_ref()
            .map(|surface| !surface.is_enabled())
            .unwrap_or(false);

        let mode = self
            .policy
            .classify(&devices, self.source.platform_level(), char_input_disabled);
        debug!(
            "Classified {} devices as {:?} (char input disabled: {})",
            devices.len(),
            mode,
            char_input_disabled
        );
        mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::StaticDeviceSource;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Surface(AtomicBool);

    impl CharInputSurface for Surface {
        fn is_enabled(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct FailingSource;

    impl DeviceSource for FailingSource {
        fn snapshot(&self) -> Result<Vec<InputDevice>> {
            Err(Error::device_enumeration("unavailable"))
        }
    }

    fn classifier(devices: Vec<InputDevice>) -> DeviceClassifier {
        DeviceClassifier::new(
            Arc::new(StaticDeviceSource::new(devices)),
            ClassifierPolicy::default(),
        )
    }

    #[test]
    fn test_external_mouse_is_pointer() {
        let c = classifier(vec![
            InputDevice::new(1, "touchscreen"),
            InputDevice::new(2, "USB Mouse").with_external(true),
        ]);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::PointerDriven);
    }

    #[test]
    fn test_empty_snapshot_is_touch() {
        let c = classifier(vec![]);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);
    }

    #[test]
    fn test_virtual_mouse_is_touch() {
        let c = classifier(vec![InputDevice::new(1, "Virtual Mouse")
            .with_virtual(true)
            .with_external(true)]);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);
    }

    #[test]
    fn test_touch_only_devices_are_touch() {
        let c = classifier(vec![
            InputDevice::new(1, "sec_touchscreen"),
            InputDevice::new(2, "gpio-keys").with_external(true),
        ]);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);
    }

    #[test]
    fn test_internal_mouse_needs_legacy_platform() {
        let devices = vec![InputDevice::new(1, "Builtin Mouse")];
        let policy = ClassifierPolicy::default();

        assert_eq!(
            policy.classify(&devices, Some(28), false),
            InteractionMode::PointerDriven
        );
        assert_eq!(
            policy.classify(&devices, Some(29), false),
            InteractionMode::TouchDriven
        );
        assert_eq!(
            policy.classify(&devices, None, false),
            InteractionMode::TouchDriven
        );
    }

    #[test]
    fn test_token_match_is_case_sensitive() {
        let policy = ClassifierPolicy::default();
        assert!(policy.name_is_pointer("Razer Mouse"));
        assert!(!policy.name_is_pointer("razer mouse"));
    }

    #[test]
    fn test_custom_tokens() {
        let policy = ClassifierPolicy {
            pointer_tokens: vec!["Trackpad".into(), "".into()],
            ..Default::default()
        };
        assert!(policy.name_is_pointer("Magic Trackpad"));
        assert!(!policy.name_is_pointer("USB Mouse"));
    }

    #[test]
    fn test_disabled_char_input_counts_external_device() {
        let surface = Arc::new(Surface(AtomicBool::new(true)));
        let c = classifier(vec![InputDevice::new(3, "Gamepad").with_external(true)])
            .with_char_input(surface.clone());

        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);

        surface.0.store(false, Ordering::SeqCst);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::PointerDriven);
    }

    #[test]
    fn test_reclassifies_after_hot_plug() {
        let source = Arc::new(StaticDeviceSource::empty());
        let c = DeviceClassifier::new(source.clone(), ClassifierPolicy::default());
        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);

        source.set_devices(vec![InputDevice::new(9, "BT Mouse").with_external(true)]);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::PointerDriven);

        source.set_devices(vec![]);
        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);
    }

    #[test]
    fn test_enumeration_failure_is_touch() {
        let c = DeviceClassifier::new(Arc::new(FailingSource), ClassifierPolicy::default());
        assert_eq!(c.classify_interaction_mode(), InteractionMode::TouchDriven);
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: ClassifierPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, ClassifierPolicy::default());
    }
}
