//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, log filter,
//! snapshot location, and what happens to the stakes of deleted owners.

use entrel_store::OwnershipRetention;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// `tracing` filter directives (default: "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// JSON snapshot loaded on startup and written on shutdown
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Whether a deleted owner's stakes stay in other companies' ledgers
    #[serde(default)]
    pub ownership_retention: OwnershipRetention,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl ApiConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address is empty".to_string()));
        }
        EnvFilter::try_new(&self.log_filter)
            .map_err(|e| ConfigError::Invalid(format!("log_filter: {}", e)))?;
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ApiConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            log_filter: default_log_filter(),
            snapshot_path: None,
            ownership_retention: OwnershipRetention::Retain,
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
