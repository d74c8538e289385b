//! Configuration for the orchestration services.
//!
//! Loaded from TOML with serde defaults, so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning knobs for attention budgeting and explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Digest slots available per tick
    pub max_events_per_tick: usize,
    /// Size of the archive's most-recent window
    pub archive_recent_window: usize,
    /// Size of the archive's top-K severity ranking
    pub archive_top_k: usize,
    /// Explanation timeline entries retained
    pub history_limit: usize,
    /// Recent activations surfaced in the director feed
    pub feed_recent_window: usize,
    /// Timeline entries consulted by the "why" router
    pub why_lookback: usize,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            max_events_per_tick: 6,
            archive_recent_window: 64,
            archive_top_k: 16,
            history_limit: 50,
            feed_recent_window: 10,
            why_lookback: 10,
        }
    }
}

impl DirectorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DirectorConfig::default();
        assert_eq!(config.max_events_per_tick, 6);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.feed_recent_window, 10);
        assert_eq!(config.why_lookback, 10);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DirectorConfig::from_toml("max_events_per_tick = 4").unwrap();
        assert_eq!(config.max_events_per_tick, 4);
        assert_eq!(config.archive_recent_window, 64);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(DirectorConfig::from_toml("max_events_per_tick = \"many\"").is_err());
    }
}
