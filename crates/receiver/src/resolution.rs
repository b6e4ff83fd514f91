//! Permission resolution extracted from a platform event

use crate::error::{ReceiverError, Result};
use common::{EXTRA_DEVICE, EXTRA_PERMISSION_GRANTED, Intent, UsbDevice};

/// Outcome of a single USB device permission request
///
/// Built from the incoming intent at delivery time and dropped once the
/// diagnostic has been emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResolution {
    pub device: Option<UsbDevice>,
    pub granted: bool,
}

impl PermissionResolution {
    /// Decode the device and permission extras
    ///
    /// Only a wrong-typed device fails; a missing or wrong-typed permission
    /// flag reads as `false`.
    pub fn from_intent(intent: &Intent) -> Result<Self> {
        let device = intent
            .device_extra(EXTRA_DEVICE)
            .map_err(|source| ReceiverError::EventExtraction {
                field: "device",
                source,
            })?;
        let granted = intent.bool_extra(EXTRA_PERMISSION_GRANTED, false);

        Ok(Self { device, granted })
    }

    /// The device access was granted for, if any
    ///
    /// `granted` without a device counts as a denial.
    pub fn granted_device(&self) -> Option<&UsbDevice> {
        if self.granted {
            self.device.as_ref()
        } else {
            None
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted_device().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_utils::create_permission_intent;

    #[test]
    fn test_granted_requires_device() {
        let resolution = PermissionResolution {
            device: None,
            granted: true,
        };
        assert!(!resolution.is_granted());
        assert!(resolution.granted_device().is_none());
    }

    #[test]
    fn test_denied_with_device() {
        let resolution = PermissionResolution {
            device: Some(UsbDevice::new("USB Camera")),
            granted: false,
        };
        assert!(!resolution.is_granted());
    }

    #[test]
    fn test_granted_with_device() {
        let resolution = PermissionResolution {
            device: Some(UsbDevice::new("USB Camera")),
            granted: true,
        };
        assert_eq!(
            resolution.granted_device().map(|d| d.name.as_str()),
            Some("USB Camera")
        );
    }

    #[test]
    fn test_missing_flag_defaults_to_denied() {
        let intent = create_permission_intent("a", Some(UsbDevice::new("X")), None);
        let resolution = PermissionResolution::from_intent(&intent).unwrap();
        assert!(!resolution.granted);
        assert!(!resolution.is_granted());
    }

    #[test]
    fn test_malformed_device_is_extraction_error() {
        let intent = Intent::new("a").with_extra(EXTRA_DEVICE, 42i64);
        let err = PermissionResolution::from_intent(&intent).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to extract device from event: extra 'device' has type int, expected UsbDevice"
        );
    }

    #[test]
    fn test_malformed_flag_reads_as_denied() {
        let intent = Intent::new("a")
            .with_extra(EXTRA_DEVICE, UsbDevice::new("USB Camera"))
            .with_extra(EXTRA_PERMISSION_GRANTED, "yes");
        let resolution = PermissionResolution::from_intent(&intent).unwrap();
        assert!(!resolution.granted);
        assert!(!resolution.is_granted());
        assert_eq!(resolution.device, Some(UsbDevice::new("USB Camera")));
    }
}
