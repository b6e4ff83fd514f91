//! Async channel bridge between Tokio runtime and the dispatch thread

use crate::intent::Intent;
use async_channel::{Receiver, Sender, bounded};

/// Default bridge capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Commands from Tokio runtime to the dispatch thread
#[derive(Debug)]
pub enum PlatformCommand {
    /// Deliver an intent to every matching registered receiver
    Deliver(Intent),

    /// Stop the dispatch thread
    Shutdown,
}

/// Handle for Tokio runtime (async)
#[derive(Clone)]
pub struct IntentBridge {
    cmd_tx: Sender<PlatformCommand>,
}

impl IntentBridge {
    /// Send a command to the dispatch thread
    pub async fn send_command(&self, cmd: PlatformCommand) -> crate::Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Queue an intent for delivery
    pub async fn deliver(&self, intent: Intent) -> crate::Result<()> {
        self.send_command(PlatformCommand::Deliver(intent)).await
    }

    /// Queue an intent from a plain OS thread (blocking)
    pub fn deliver_blocking(&self, intent: Intent) -> crate::Result<()> {
        self.cmd_tx
            .send_blocking(PlatformCommand::Deliver(intent))
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Ask the dispatch thread to stop
    pub async fn shutdown(&self) -> crate::Result<()> {
        self.send_command(PlatformCommand::Shutdown).await
    }
}

/// Handle for the dispatch thread (blocking)
pub struct IntentWorker {
    cmd_rx: Receiver<PlatformCommand>,
}

impl IntentWorker {
    /// Receive a command from Tokio runtime (blocking)
    ///
    /// Fails once every [`IntentBridge`] has been dropped and the queue is empty.
    pub fn recv_command(&self) -> crate::Result<PlatformCommand> {
        self.cmd_rx
            .recv_blocking()
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Try to receive a command without blocking
    pub fn try_recv_command(&self) -> Option<PlatformCommand> {
        self.cmd_rx.try_recv().ok()
    }
}

/// Create the channel bridge between Tokio and the dispatch thread
///
/// Returns (IntentBridge for Tokio, IntentWorker for the dispatch thread)
pub fn create_intent_bridge(capacity: usize) -> (IntentBridge, IntentWorker) {
    let (cmd_tx, cmd_rx) = bounded(capacity.max(1));

    (IntentBridge { cmd_tx }, IntentWorker { cmd_rx })
}
