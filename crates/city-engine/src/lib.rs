//! Deterministic tick kernel for the city simulation.
//!
//! The engine advances a fixed subsystem pipeline over shared state, funnels
//! raw events through the attention budget, drives authored story seeds, and
//! records a causal timeline for "why" queries. Given the same world
//! definition, config, and seed, two runs produce byte-identical snapshots.

pub mod config;
pub mod engine;
pub mod error;
pub mod views;

pub use config::{EngineConfig, EngineConfigError};
pub use engine::SimEngine;
pub use error::EngineError;
pub use views::{query_view, ViewQuery};
