//! USB permission receiver
//!
//! Handles the one-shot platform notification that a USB device permission
//! prompt has been resolved, and reports the outcome as a diagnostic record.
//!
//! The receiver is stateless. The host owns a [`Broadcaster`], registers the
//! receiver against an [`IntentFilter`] at startup, and feeds intents to it
//! from the dispatch worker thread.

pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod receiver;
pub mod replay;
pub mod resolution;
pub mod worker;

pub use config::ReceiverConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, Severity, TracingSink};
pub use dispatcher::{BroadcastReceiver, Broadcaster, IntentFilter, RegistrationId};
pub use error::{ReceiverError, Result};
pub use receiver::{ACTION_USB_PERMISSION, TAG, UsbPermissionReceiver};
pub use replay::{ReplayStats, replay_lines, replay_lines_blocking};
pub use resolution::PermissionResolution;
pub use worker::{DispatchStats, DispatchWorkerThread, spawn_dispatch_worker};
