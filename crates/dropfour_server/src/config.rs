//! Server configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, and command-line overrides.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime settings for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// Board width of new rooms.
    columns: usize,

    /// Board height of new rooms.
    rows: usize,

    /// Seconds before an empty room is deleted.
    expiry_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            columns: 7,
            rows: 6,
            expiry_secs: 10,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Address to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Board width of new rooms.
    pub columns: Option<usize>,
    /// Board height of new rooms.
    pub rows: Option<usize>,
    /// Seconds before an empty room is deleted.
    pub expiry_secs: Option<u64>,
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys keep their
    /// defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()
    }

    /// Applies command-line overrides on top of this configuration.
    #[instrument(skip(self))]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(columns) = overrides.columns {
            self.columns = columns;
        }
        if let Some(rows) = overrides.rows {
            self.rows = rows;
        }
        if let Some(expiry_secs) = overrides.expiry_secs {
            self.expiry_secs = expiry_secs;
        }
        self.validate()
    }

    /// Delay before an empty room is deleted.
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::new(format!(
                "Board must have at least one column and one row, got {}x{}",
                self.columns, self.rows
            )));
        }
        Ok(self)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
