//! Dispatch worker thread
//!
//! Dedicated thread standing in for the platform's event-dispatch loop. It
//! receives intents from the Tokio runtime over the async channel bridge and
//! hands each one to the [`Broadcaster`] synchronously.

use crate::dispatcher::Broadcaster;
use common::{IntentWorker, PlatformCommand};
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// Counters reported when the worker exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Intents received from the bridge
    pub received: u64,
    /// Intents delivered to at least one receiver
    pub delivered: u64,
    /// Intents no registered filter matched
    pub unmatched: u64,
    /// Deliveries aborted by a panicking receiver
    pub panicked: u64,
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} intent(s): {} delivered, {} unmatched, {} panicked",
            self.received, self.delivered, self.unmatched, self.panicked
        )
    }
}

/// Dispatch worker thread
pub struct DispatchWorkerThread {
    broadcaster: Arc<Broadcaster>,
    worker: IntentWorker,
    stats: DispatchStats,
}

impl DispatchWorkerThread {
    pub fn new(worker: IntentWorker, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            broadcaster,
            worker,
            stats: DispatchStats::default(),
        }
    }

    /// Run the dispatch loop
    ///
    /// Continues until a Shutdown command is received or every bridge handle
    /// has been dropped.
    pub fn run(mut self) -> DispatchStats {
        info!("Dispatch worker thread started");

        loop {
            match self.worker.recv_command() {
                Ok(PlatformCommand::Deliver(intent)) => self.deliver(&intent),
                Ok(PlatformCommand::Shutdown) => {
                    info!("Dispatch worker shutting down");
                    break;
                }
                Err(e) => {
                    debug!("Command channel closed: {}", e);
                    break;
                }
            }
        }

        info!(
            received = self.stats.received,
            delivered = self.stats.delivered,
            unmatched = self.stats.unmatched,
            panicked = self.stats.panicked,
            "Dispatch worker thread stopped"
        );
        self.stats
    }

    fn deliver(&mut self, intent: &common::Intent) {
        self.stats.received += 1;

        // A receiver panic must not take the dispatch loop down with it
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.broadcaster.dispatch(intent)
        }));

        match result {
            Ok(0) => {
                self.stats.unmatched += 1;
                debug!("No receiver registered for {:?}", intent.action());
            }
            Ok(_) => self.stats.delivered += 1,
            Err(e) => {
                self.stats.panicked += 1;
                error!("Panic in broadcast receiver: {:?}", e);
            }
        }
    }
}

/// Spawn the dispatch worker on a named OS thread
pub fn spawn_dispatch_worker(
    worker: IntentWorker,
    broadcaster: Arc<Broadcaster>,
) -> std::io::Result<JoinHandle<DispatchStats>> {
    std::thread::Builder::new()
        .name("intent-dispatch".to_string())
        .spawn(move || DispatchWorkerThread::new(worker, broadcaster).run())
        .inspect_err(|e| warn!("Failed to spawn dispatch worker: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_summary_includes_panics() {
        let stats = DispatchStats {
            received: 4,
            delivered: 2,
            unmatched: 1,
            panicked: 1,
        };
        assert_eq!(
            stats.to_string(),
            "4 intent(s): 2 delivered, 1 unmatched, 1 panicked"
        );
    }
}
