//! Interpreter configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Runtime limits and host settings.
///
/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Nested method invocations allowed before evaluation is aborted
    pub max_call_depth: usize,
    /// Remaining native stack (bytes) that triggers stack growth
    pub stack_red_zone: usize,
    /// Bytes added each time the native stack grows
    pub stack_grow_size: usize,
    /// REPL history file, relative to the home directory
    pub history_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: 10_000,
            stack_red_zone: 128 * 1024,
            stack_grow_size: 4 * 1024 * 1024,
            history_file: ".rooby_history".to_string(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
