//! USB permission event handler

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::dispatcher::{BroadcastReceiver, IntentFilter};
use crate::resolution::PermissionResolution;
use common::Intent;

/// Component tag carried by every diagnostic this receiver emits
pub const TAG: &str = "UsbPermissionReceiver";

/// Action tag of the permission-result broadcast
pub const ACTION_USB_PERMISSION: &str = "com.example.smart_usb.USB_PERMISSION";

/// Reports the outcome of USB permission prompts
///
/// Stateless: each delivery is handled independently and produces exactly
/// one diagnostic, or none when the intent carries a different action.
/// Extraction failures are reported at error level and never propagate.
#[derive(Debug, Clone)]
pub struct UsbPermissionReceiver<S = TracingSink> {
    action: String,
    sink: S,
}

impl UsbPermissionReceiver<TracingSink> {
    /// Receiver for [`ACTION_USB_PERMISSION`] logging through `tracing`
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }
}

impl Default for UsbPermissionReceiver<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> UsbPermissionReceiver<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            action: ACTION_USB_PERMISSION.to_string(),
            sink,
        }
    }

    /// Listen for a different application-specific action tag
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Filter to register this receiver under
    pub fn filter(&self) -> IntentFilter {
        IntentFilter::new(self.action.clone())
    }

    fn describe(resolution: &PermissionResolution) -> Diagnostic {
        match resolution.granted_device() {
            Some(device) => {
                Diagnostic::info(TAG, format!("Permission granted for device {}", device))
            }
            None => Diagnostic::info(TAG, "Permission denied for device"),
        }
    }
}

impl<S: DiagnosticSink> BroadcastReceiver for UsbPermissionReceiver<S> {
    fn on_receive(&self, intent: &Intent) {
        if intent.action() != Some(self.action.as_str()) {
            return;
        }

        let record = match PermissionResolution::from_intent(intent) {
            Ok(resolution) => Self::describe(&resolution),
            Err(e) => Diagnostic::error(TAG, format!("Error in USB permission receiver: {}", e)),
        };
        self.sink.emit(record);
    }
}
