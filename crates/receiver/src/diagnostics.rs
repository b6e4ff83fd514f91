//! Diagnostic records and the sinks that receive them
//!
//! Emission is fire-and-forget: sinks return nothing and must not block.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Severity of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// One diagnostic record: severity, component tag, free-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub tag: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn info(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            tag,
            message: message.into(),
        }
    }

    pub fn error(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            tag,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.tag, self.message)
    }
}

/// Destination for diagnostic records
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, record: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn emit(&self, record: Diagnostic) {
        (**self).emit(record)
    }
}

/// Sink that forwards records to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, record: Diagnostic) {
        match record.severity {
            Severity::Info => info!(component = record.tag, "{}", record.message),
            Severity::Error => error!(component = record.tag, "{}", record.message),
        }
    }
}

/// Sink that keeps every record in memory
///
/// Useful for embedding hosts that surface diagnostics themselves, and for
/// asserting exact emission counts in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records emitted so far
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return all records
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, record: Diagnostic) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
