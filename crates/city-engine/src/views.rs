//! Read-only JSON views over the engine state.
//!
//! One string-keyed entry point so embedding layers (CLI, UI, scripting)
//! can query without linking against every state type. Unknown view names
//! and missing required parameters are caller mistakes and return errors;
//! unknown entity ids are routine lookups and return `{"error": ...}`
//! values instead.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::engine::SimEngine;
use crate::error::EngineError;

const DEFAULT_COUNT: usize = 10;

/// Optional parameters for a view query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    /// Entity id, required by the singular entity views
    pub id: Option<String>,
    /// Result cap for list-shaped views
    pub count: Option<usize>,
}

/// Resolves one named view against the current state.
pub fn query_view(engine: &SimEngine, view: &str, query: &ViewQuery) -> Result<Value, EngineError> {
    let state = engine.state()?;
    let count = query.count.unwrap_or(DEFAULT_COUNT);

    match view {
        "city" => Ok(json!({
            "name": state.city.name,
            "tick": state.tick,
            "districts": state.city.districts.len(),
            "mean_unrest": state.city.mean_unrest(),
            "mean_pollution": state.city.mean_pollution(),
            "mean_prosperity": state.city.mean_prosperity(),
        })),
        "districts" => Ok(serde_json::to_value(&state.city.districts)?),
        "district" => {
            let id = require_id(view, query)?;
            match state.city.districts.get(id) {
                Some(district) => Ok(serde_json::to_value(district)?),
                None => Ok(json!({ "error": format!("unknown district id '{}'", id) })),
            }
        }
        "factions" => Ok(serde_json::to_value(&state.factions)?),
        "faction" => {
            let id = require_id(view, query)?;
            match state.factions.get(id) {
                Some(faction) => Ok(serde_json::to_value(faction)?),
                None => Ok(json!({ "error": format!("unknown faction id '{}'", id) })),
            }
        }
        "agents" => Ok(serde_json::to_value(&state.agents)?),
        "agent" => {
            let id = require_id(view, query)?;
            match state.agents.get(id) {
                Some(agent) => Ok(serde_json::to_value(agent)?),
                None => Ok(json!({ "error": format!("unknown agent id '{}'", id) })),
            }
        }
        "environment" => Ok(serde_json::to_value(&state.environment)?),
        "economy" => Ok(serde_json::to_value(&state.economy)?),
        "progression" => Ok(serde_json::to_value(&state.progression)?),
        "focus" => Ok(serde_json::to_value(&state.metadata.focus_state)?),
        "digest" => Ok(serde_json::to_value(&state.metadata.last_digest)?),
        "archive" => Ok(serde_json::to_value(state.metadata.archive.recent(count))?),
        "archive_top" => Ok(serde_json::to_value(state.metadata.archive.top(count))?),
        "timeline" => Ok(serde_json::to_value(engine.timeline(count)?)?),
        "profiling" => Ok(serde_json::to_value(engine.profiling_summary()?)?),
        other => Err(EngineError::Validation(format!(
            "unknown view '{}'",
            other
        ))),
    }
}

fn require_id<'q>(view: &str, query: &'q ViewQuery) -> Result<&'q str, EngineError> {
    query
        .id
        .as_deref()
        .ok_or_else(|| EngineError::Validation(format!("view '{}' requires an id", view)))
}
