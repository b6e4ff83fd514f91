//! Receiver configuration management

use crate::receiver::ACTION_USB_PERMISSION;
use anyhow::{Context, Result, anyhow};
use common::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiverConfig {
    #[serde(default)]
    pub receiver: ReceiverSettings,
    /// Dispatch bridge configuration
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverSettings {
    /// Action tag the permission receiver is registered for
    #[serde(default = "ReceiverSettings::default_action")]
    pub action: String,
    #[serde(default = "ReceiverSettings::default_log_level")]
    pub log_level: String,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            action: Self::default_action(),
            log_level: Self::default_log_level(),
        }
    }
}

impl ReceiverSettings {
    fn default_action() -> String {
        ACTION_USB_PERMISSION.to_string()
    }

    fn default_log_level() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Intents buffered between the reader and the dispatch thread
    #[serde(default = "DispatchSettings::default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            queue_capacity: Self::default_queue_capacity(),
        }
    }
}

impl DispatchSettings {
    fn default_queue_capacity() -> usize {
        DEFAULT_QUEUE_CAPACITY
    }
}

impl ReceiverConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref())
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/usb-permission-receiver/receiver.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ReceiverConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir
                .join("usb-permission-receiver")
                .join("receiver.toml")
        } else {
            PathBuf::from(".config/usb-permission-receiver/receiver.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.receiver.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.receiver.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.receiver.action.trim().is_empty() {
            return Err(anyhow!("Receiver action must not be empty"));
        }

        if self.dispatch.queue_capacity == 0 {
            return Err(anyhow!("Dispatch queue capacity must be at least 1"));
        }

        Ok(())
    }
}
