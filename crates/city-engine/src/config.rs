//! Engine configuration.
//!
//! Loaded from TOML with serde defaults; the director section nests the
//! orchestration services' own config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use city_core::LodMode;
use city_director::DirectorConfig;

/// Top-level engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on ticks per `advance_ticks` call
    pub engine_max_ticks: u64,
    /// Profiling samples retained in the rolling window
    pub history_window: usize,
    /// Level-of-detail mode applied at initialization
    pub lod: LodMode,
    pub director: DirectorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_max_ticks: 1000,
            history_window: 120,
            lod: LodMode::Standard,
            director: DirectorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, EngineConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, EngineConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum EngineConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
