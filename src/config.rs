//! Mock controller configuration.
//!
//! Every field has a built-in default, so an empty TOML file is a valid
//! config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tablet_proto::{Exporter, Stats};

/// Default capacity of each event queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Default stats exporter name
pub const DEFAULT_EXPORTER_NAME: &str = "MockController";

/// Default stats exporter label
pub const DEFAULT_EXPORTER_LABEL: &str = "Tablet";

/// Mock controller settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockConfig {
    /// Capacity of the state-change and broadcast queues. A full queue
    /// blocks the producing call until a consumer drains it.
    pub queue_capacity: usize,
    /// Name the stats exporter is registered under
    pub exporter_name: String,
    /// Label the stats exporter is registered under
    pub exporter_label: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            exporter_name: DEFAULT_EXPORTER_NAME.to_string(),
            exporter_label: DEFAULT_EXPORTER_LABEL.to_string(),
        }
    }
}

impl MockConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: MockConfig = toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Set the queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // a zero-capacity sync channel is a rendezvous: every push would
        // wait for a live receiver
        if self.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.exporter_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "exporter_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the stats bundle this config describes
    pub fn stats(&self) -> Stats {
        Stats::new(Exporter::new(&self.exporter_name, &self.exporter_label))
    }
}

/// Errors loading a mock config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
