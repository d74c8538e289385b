//! The uniform contract every gameplay subsystem implements.
//!
//! Subsystems are registered in a fixed ordered list at engine
//! construction. Each receives the shared mutable state plus a tick-scoped
//! RNG handle and returns the raw events and actions it produced; nothing
//! else crosses the boundary, and no subsystem may retain state (RNG
//! included) between ticks.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use city_events::SimEvent;

use crate::state::GameState;

/// One gameplay subsystem, invoked once per tick in registration order.
pub trait Subsystem {
    fn name(&self) -> &'static str;
    fn tick(&self, state: &mut GameState, rng: &mut SmallRng) -> SubsystemOutput;
}

/// Raw output of one subsystem for one tick.
#[derive(Debug, Clone, Default)]
pub struct SubsystemOutput {
    pub events: Vec<SimEvent>,
    pub faction_actions: Vec<FactionAction>,
    pub agent_actions: Vec<AgentAction>,
}

impl SubsystemOutput {
    pub fn merge(&mut self, other: SubsystemOutput) {
        self.events.extend(other.events);
        self.faction_actions.extend(other.faction_actions);
        self.agent_actions.extend(other.agent_actions);
    }
}

/// What a faction chose to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionActionKind {
    InvestDistrict,
    SuppressUnrest,
    Consolidate,
    ExpandTerritory,
    Stockpile,
}

/// A faction action, already applied to state by the faction subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionAction {
    pub faction_id: String,
    pub kind: FactionActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Strength of the applied effect
    pub magnitude: f32,
}

/// What an agent chose to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentActionKind {
    Work,
    Organize,
    Agitate,
    Mediate,
    Relocate,
}

/// An agent action with the reasoning that selected it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub agent_id: String,
    pub kind: AgentActionKind,
    pub district: String,
    /// One-line summary of why the action won, for the explanations layer
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_events::EventCategory;

    #[test]
    fn test_merge_concatenates_in_order() {
        let mut first = SubsystemOutput::default();
        first
            .events
            .push(SimEvent::new(0, EventCategory::Environment, "environment", 0.5, "a"));
        let mut second = SubsystemOutput::default();
        second
            .events
            .push(SimEvent::new(0, EventCategory::Economy, "economy", 0.5, "b"));

        first.merge(second);
        assert_eq!(first.events.len(), 2);
        assert_eq!(first.events[0].headline, "a");
        assert_eq!(first.events[1].headline, "b");
    }

    #[test]
    fn test_action_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&FactionActionKind::InvestDistrict).unwrap(),
            r#""invest_district""#
        );
        assert_eq!(
            serde_json::to_string(&AgentActionKind::Agitate).unwrap(),
            r#""agitate""#
        );
    }
}
