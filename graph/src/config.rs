//! TOML configuration for a commit graph and its session.
//!
//! Every field has a default, so an empty file (or no file) gives the
//! standard `main` / `"Initial commit"` setup.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Name of the initial branch; merges and rebases in a session target it.
    pub trunk: String,

    /// Message of the root commit.
    pub initial_message: String,

    /// Author recorded on new commits.
    pub author: String,

    /// Length of the random token in `<branch>-rebased-<token>`.
    pub rebase_suffix_len: usize,

    /// How many recent events the graph keeps in its log.
    pub event_log_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            trunk: "main".to_string(),
            initial_message: "Initial commit".to_string(),
            author: "learner".to_string(),
            rebase_suffix_len: 4,
            event_log_capacity: 256,
        }
    }
}

impl GraphConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading graph config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trunk.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "trunk",
                detail: "must not be empty".to_string(),
            });
        }
        if !(1..=32).contains(&self.rebase_suffix_len) {
            return Err(ConfigError::Invalid {
                field: "rebase_suffix_len",
                detail: format!("{} is outside 1..=32", self.rebase_suffix_len),
            });
        }
        Ok(())
    }
}
