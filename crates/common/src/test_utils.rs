//! Test utilities for usb-permission-receiver
//!
//! Provides mock devices and intent builders for testing across crates.
//!
//! # Example
//!
//! ```
//! use common::test_utils::{create_mock_device, create_permission_intent};
//!
//! let device = create_mock_device(1, 0x1234, 0x5678);
//! let intent = create_permission_intent("test.USB_PERMISSION", Some(device), Some(true));
//! assert_eq!(intent.action(), Some("test.USB_PERMISSION"));
//! ```

use crate::intent::{EXTRA_DEVICE, EXTRA_PERMISSION_GRANTED, Intent};
use crate::usb_types::UsbDevice;
use std::future::Future;
use std::time::Duration;

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a mock UsbDevice for testing
///
/// The name follows the platform's `/dev/bus/usb/BBB/DDD` layout.
pub fn create_mock_device(id: u32, vendor_id: u16, product_id: u16) -> UsbDevice {
    UsbDevice::new(format!("/dev/bus/usb/001/{:03}", id % 128))
        .with_ids(vendor_id, product_id)
        .with_product_name(format!("Test Product {}", id))
}

/// Create a permission-result intent
///
/// `None` leaves the corresponding extra out entirely.
pub fn create_permission_intent(
    action: &str,
    device: Option<UsbDevice>,
    granted: Option<bool>,
) -> Intent {
    let mut intent = Intent::new(action);
    if let Some(device) = device {
        intent = intent.with_extra(EXTRA_DEVICE, device);
    }
    if let Some(granted) = granted {
        intent = intent.with_extra(EXTRA_PERMISSION_GRANTED, granted);
    }
    intent
}

/// Error returned when a test future exceeds its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError {
    pub duration: Duration,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation timed out after {:?}", self.duration)
    }
}

impl std::error::Error for TimeoutError {}

/// Run a future with a timeout
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { duration })
}
