//! Platform intent model
//!
//! An [`Intent`] is the broadcast-style event the host platform delivers to
//! registered receivers: an optional action tag plus a loosely typed bag of
//! extras. Receivers pull typed values out with the getters below, which
//! follow the platform's lookup rules: missing or null means "use the
//! default". A wrong-typed device is an error, while a wrong-typed boolean
//! falls back to the default.

use crate::usb_types::UsbDevice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Extra key carrying the [`UsbDevice`] a permission event refers to
pub const EXTRA_DEVICE: &str = "device";

/// Extra key carrying the boolean permission outcome
pub const EXTRA_PERMISSION_GRANTED: &str = "permission";

/// A single extra value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Device(UsbDevice),
    Bundle(BTreeMap<String, ExtraValue>),
}

impl ExtraValue {
    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ExtraValue::Null => "null",
            ExtraValue::Bool(_) => "bool",
            ExtraValue::Int(_) => "int",
            ExtraValue::Float(_) => "float",
            ExtraValue::Str(_) => "string",
            ExtraValue::Device(_) => "UsbDevice",
            ExtraValue::Bundle(_) => "bundle",
        }
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Bool(value)
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        ExtraValue::Int(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Str(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Str(value)
    }
}

impl From<UsbDevice> for ExtraValue {
    fn from(value: UsbDevice) -> Self {
        ExtraValue::Device(value)
    }
}

impl<T: Into<ExtraValue>> From<Option<T>> for ExtraValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ExtraValue::Null, Into::into)
    }
}

/// Failure to read a typed extra
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtraError {
    #[error("extra '{key}' has type {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Broadcast-style platform event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, ExtraValue>,
}

impl Intent {
    /// Create an intent with the given action tag
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            extras: BTreeMap::new(),
        }
    }

    /// Create an intent that carries no action tag
    pub fn without_action() -> Self {
        Self::default()
    }

    /// Builder-style extra insertion
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn extra(&self, key: &str) -> Option<&ExtraValue> {
        self.extras.get(key)
    }

    /// Read a device extra; missing or null yields `None`
    pub fn device_extra(&self, key: &str) -> Result<Option<UsbDevice>, ExtraError> {
        match self.extras.get(key) {
            None | Some(ExtraValue::Null) => Ok(None),
            Some(ExtraValue::Device(device)) => Ok(Some(device.clone())),
            Some(other) => Err(ExtraError::TypeMismatch {
                key: key.to_string(),
                expected: "UsbDevice",
                found: other.kind(),
            }),
        }
    }

    /// Read a boolean extra
    ///
    /// Missing or null yields `default`. A value of another type also yields
    /// `default`, with a warning, the same way the platform's boolean lookup
    /// behaves.
    pub fn bool_extra(&self, key: &str, default: bool) -> bool {
        match self.extras.get(key) {
            None | Some(ExtraValue::Null) => default,
            Some(ExtraValue::Bool(value)) => *value,
            Some(other) => {
                warn!(
                    "Extra '{}' has type {}, expected bool; returning default {}",
                    key,
                    other.kind(),
                    default
                );
                default
            }
        }
    }

    /// Decode an intent from a single JSON document
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_extras_use_defaults() {
        let intent = Intent::new("test.ACTION");
        assert_eq!(intent.device_extra(EXTRA_DEVICE), Ok(None));
        assert!(!intent.bool_extra(EXTRA_PERMISSION_GRANTED, false));
        assert!(intent.bool_extra(EXTRA_PERMISSION_GRANTED, true));
    }

    #[test]
    fn test_null_extras_use_defaults() {
        let intent = Intent::new("test.ACTION")
            .with_extra(EXTRA_DEVICE, ExtraValue::Null)
            .with_extra(EXTRA_PERMISSION_GRANTED, ExtraValue::Null);
        assert_eq!(intent.device_extra(EXTRA_DEVICE), Ok(None));
        assert!(!intent.bool_extra(EXTRA_PERMISSION_GRANTED, false));
    }

    #[test]
    fn test_wrong_typed_extras() {
        let intent = Intent::new("test.ACTION")
            .with_extra(EXTRA_DEVICE, "USB Camera")
            .with_extra(EXTRA_PERMISSION_GRANTED, 1i64);

        let err = intent.device_extra(EXTRA_DEVICE).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extra 'device' has type string, expected UsbDevice"
        );

        // Wrong-typed booleans fall back to the default instead of failing
        assert!(!intent.bool_extra(EXTRA_PERMISSION_GRANTED, false));
        assert!(intent.bool_extra(EXTRA_PERMISSION_GRANTED, true));
    }

    #[test]
    fn test_decode_permission_event() {
        let json = r#"{
            "action": "com.example.smart_usb.USB_PERMISSION",
            "extras": {
                "device": {"name": "USB Camera", "vendor_id": 1133, "product_id": 2085},
                "permission": true
            }
        }"#;
        let intent = Intent::from_json(json).unwrap();

        assert_eq!(intent.action(), Some("com.example.smart_usb.USB_PERMISSION"));
        let device = intent.device_extra(EXTRA_DEVICE).unwrap().unwrap();
        assert_eq!(device.name, "USB Camera");
        assert_eq!(device.vendor_id, Some(0x046d));
        assert!(intent.bool_extra(EXTRA_PERMISSION_GRANTED, false));
    }

    #[test]
    fn test_decode_non_device_object_as_bundle() {
        let json = r#"{"action": "a", "extras": {"device": {"serial": "123"}}}"#;
        let intent = Intent::from_json(json).unwrap();

        assert_eq!(intent.extra(EXTRA_DEVICE).map(ExtraValue::kind), Some("bundle"));
        assert!(intent.device_extra(EXTRA_DEVICE).is_err());
    }

    #[test]
    fn test_decode_without_action() {
        let intent = Intent::from_json("{}").unwrap();
        assert_eq!(intent, Intent::without_action());
        assert_eq!(intent.action(), None);
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(
            Intent::from_json("not json"),
            Err(crate::Error::Decode(_))
        ));
    }

    #[test]
    fn test_option_into_extra() {
        let intent = Intent::new("a").with_extra(EXTRA_DEVICE, None::<UsbDevice>);
        assert_eq!(intent.extra(EXTRA_DEVICE), Some(&ExtraValue::Null));
    }
}
