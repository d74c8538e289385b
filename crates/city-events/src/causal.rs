//! Causal events and the explanations timeline.
//!
//! The explanations layer converts per-tick deltas and actions into
//! `CausalEvent`s, grouped into `TimelineEntry`s that answer "why did X
//! change?" queries. Entries are immutable once recorded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category of a causal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalCategory {
    Environment,
    Faction,
    Agent,
}

/// A structured record linking a tick, an entity or metric, and inferred
/// causes and effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalEvent {
    pub tick: u64,
    pub category: CausalCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Net numeric change this event describes
    pub delta: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl CausalEvent {
    /// Creates a causal event with no entity, causes, or effects.
    pub fn new(
        tick: u64,
        category: CausalCategory,
        description: impl Into<String>,
        delta: f32,
    ) -> Self {
        Self {
            tick,
            category,
            description: description.into(),
            entity_id: None,
            entity_name: None,
            delta,
            causes: Vec::new(),
            effects: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attaches the entity this event is about.
    pub fn for_entity(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self.entity_name = Some(name.into());
        self
    }

    /// Adds a cause label.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Adds an effect label.
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    /// Adds a metadata key/value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Point-in-time copy of the global environment, embedded in each timeline
/// entry so explanations can be rendered without replaying state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub stability: f32,
    pub unrest: f32,
    pub pollution: f32,
    pub biodiversity: f32,
}

/// One tick's worth of causal history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub tick: u64,
    pub events: Vec<CausalEvent>,
    /// One-line reasoning summaries from agent decisions this tick
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_reasoning: Vec<String>,
    pub environment: EnvironmentSnapshot,
    /// Human-readable summaries of the largest changes this tick
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_changes: Vec<String>,
}
