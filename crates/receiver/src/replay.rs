//! JSON-lines intent replay
//!
//! Each non-empty line that does not start with `#` is decoded as one
//! [`Intent`] and queued on the dispatch bridge. Lines that fail to decode are
//! skipped with a warning; only a read failure or a closed bridge stops the
//! replay.

use anyhow::{Context, Result};
use common::{Intent, IntentBridge};
use std::io::BufRead;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

/// Line counters for one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Lines read, including blank and comment lines
    pub lines: u64,
    /// Intents queued on the bridge
    pub delivered: u64,
    /// Lines that could not be decoded
    pub skipped: u64,
}

impl ReplayStats {
    /// Decode one line, updating the counters
    fn parse(&mut self, line: &str) -> Option<Intent> {
        self.lines += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        match Intent::from_json(line) {
            Ok(intent) => Some(intent),
            Err(e) => {
                self.skipped += 1;
                warn!("Skipping line {}: {}", self.lines, e);
                None
            }
        }
    }
}

/// Stream intents from an async reader into the dispatch bridge
pub async fn replay_lines<R>(reader: R, bridge: &IntentBridge) -> Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if let Some(intent) = stats.parse(&line) {
            bridge
                .deliver(intent)
                .await
                .context("Dispatch worker stopped unexpectedly")?;
            stats.delivered += 1;
        }
    }

    Ok(stats)
}

/// Stream intents from a blocking reader into the dispatch bridge
///
/// Meant for a dedicated OS thread, e.g. one reading an interactive stdin.
pub fn replay_lines_blocking<R>(reader: R, bridge: &IntentBridge) -> Result<ReplayStats>
where
    R: BufRead,
{
    let mut stats = ReplayStats::default();

    for line in reader.lines() {
        let line = line.context("Failed to read input")?;
        if let Some(intent) = stats.parse(&line) {
            bridge
                .deliver_blocking(intent)
                .context("Dispatch worker stopped unexpectedly")?;
            stats.delivered += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let mut stats = ReplayStats::default();
        assert!(stats.parse("").is_none());
        assert!(stats.parse("   ").is_none());
        assert!(stats.parse("# recorded 2025-01-01").is_none());
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_parse_counts_garbage() {
        let mut stats = ReplayStats::default();
        assert!(stats.parse("{not json").is_none());
        assert_eq!(stats.skipped, 1);

        assert!(stats.parse(r#"{"action":"a"}"#).is_some());
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.skipped, 1);
    }
}
