//! Common utilities for usb-permission-receiver
//!
//! This crate provides the host-side pieces shared by the receiver library and
//! its binary: the intent (platform event) model, USB device handles, error
//! handling, logging setup, and the async channel bridge that feeds the
//! blocking dispatch thread.

pub mod channel;
pub mod error;
pub mod intent;
pub mod logging;
pub mod test_utils;
pub mod usb_types;

pub use channel::{
    DEFAULT_QUEUE_CAPACITY, IntentBridge, IntentWorker, PlatformCommand, create_intent_bridge,
};
pub use error::{Error, Result};
pub use intent::{EXTRA_DEVICE, EXTRA_PERMISSION_GRANTED, ExtraError, ExtraValue, Intent};
pub use logging::setup_logging;
pub use usb_types::UsbDevice;
