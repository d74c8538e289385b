//! Engine error taxonomy.

use thiserror::Error;

/// Errors surfaced by the engine's public API.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine state accessed before initialize_state")]
    Uninitialized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("tick count {requested} exceeds engine limit {limit}")]
    TickLimit { requested: u64, limit: u64 },

    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::EngineConfigError),
}
