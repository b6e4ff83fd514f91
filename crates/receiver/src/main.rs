//! usb-permission-receiver
//!
//! Hosts the USB permission receiver outside the device platform: replays
//! recorded permission-result intents (one JSON document per line) through
//! the same registration and dispatch path the platform would use.

use anyhow::{Context, Result};
use clap::Parser;
use common::{IntentBridge, create_intent_bridge, setup_logging};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};
use usb_permission_receiver::{
    Broadcaster, ReceiverConfig, ReplayStats, UsbPermissionReceiver, replay_lines,
    replay_lines_blocking, spawn_dispatch_worker,
};

#[derive(Parser, Debug)]
#[command(name = "usb-permission-receiver")]
#[command(
    author,
    version,
    about = "USB permission receiver - report the outcome of USB permission prompts"
)]
#[command(long_about = "
Replays USB permission-result events through the permission receiver and
logs whether access to each device was granted or denied.

Each input line is one JSON intent, for example:
    {\"action\": \"com.example.smart_usb.USB_PERMISSION\",
     \"extras\": {\"device\": {\"name\": \"USB Camera\"}, \"permission\": true}}

EXAMPLES:
    # Replay events from a file
    usb-permission-receiver --input events.jsonl

    # Read events from stdin with debug logging
    usb-permission-receiver --log-level debug < events.jsonl

CONFIGURATION:
    The receiver looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usb-permission-receiver/receiver.toml
    3. /etc/usb-permission-receiver/receiver.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// File of JSON intents, one per line (defaults to stdin)
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Override the action tag the receiver listens for
    #[arg(long, value_name = "ACTION")]
    action: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = ReceiverConfig::default();
        let path = ReceiverConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config {
        ReceiverConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        ReceiverConfig::load_or_default()
    };
    if let Some(action) = args.action {
        config.receiver.action = action;
    }
    if let Some(level) = args.log_level {
        config.receiver.log_level = level;
    }
    config.validate().context("Invalid configuration")?;

    setup_logging(&config.receiver.log_level).context("Failed to setup logging")?;

    info!("usb-permission-receiver v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening for action: {}", config.receiver.action);

    // Registration happens once at startup and is torn down before exit
    let broadcaster = Arc::new(Broadcaster::new());
    let receiver = UsbPermissionReceiver::new().with_action(config.receiver.action.clone());
    let registration = broadcaster.register(receiver.filter(), Arc::new(receiver));

    let (bridge, worker) = create_intent_bridge(config.dispatch.queue_capacity);
    let worker_handle = spawn_dispatch_worker(worker, Arc::clone(&broadcaster))
        .context("Failed to start dispatch worker")?;

    let result = tokio::select! {
        result = replay(args.input.as_deref(), &bridge) => result.map(|stats| {
            info!(
                "Read {} line(s): {} intent(s) queued, {} skipped",
                stats.lines, stats.delivered, stats.skipped
            );
        }),
        _ = signal::ctrl_c() => {
            info!("Received Ctrl-C, stopping");
            Ok(())
        }
    };

    if let Err(e) = bridge.shutdown().await {
        error!("Error shutting down dispatch worker: {:#}", e);
    }
    match worker_handle.join() {
        Ok(stats) => info!("Processed {}", stats),
        Err(e) => error!("Dispatch worker thread panicked: {:?}", e),
    }
    broadcaster.unregister(registration);

    result
}

/// Stream intents from the input into the dispatch bridge
async fn replay(input: Option<&Path>, bridge: &IntentBridge) -> Result<ReplayStats> {
    match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input: {}", path.display()))?;
            replay_lines(BufReader::new(file), bridge).await
        }
        None => replay_stdin(bridge.clone()).await,
    }
}

/// Read stdin on its own OS thread
///
/// A pending terminal read is never awaited by the runtime, so Ctrl-C exits
/// without waiting for another line.
async fn replay_stdin(bridge: IntentBridge) -> Result<ReplayStats> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let result = replay_lines_blocking(std::io::stdin().lock(), &bridge);
            let _ = tx.send(result);
        })
        .context("Failed to start stdin reader")?;

    rx.await.context("Stdin reader exited without a result")?
}
