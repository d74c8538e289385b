//! Raw simulation events.
//!
//! Subsystems emit `SimEvent`s every tick. The engine assigns ids in
//! generation order, then the attention budget decides which events surface
//! in the player digest and which are archived.

use serde::{Deserialize, Serialize};

/// Category of a raw simulation event, keyed by the subsystem family that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Environment,
    Economy,
    Faction,
    Agent,
    Story,
    Progression,
}

/// Generates an event id from the tick and the event's position in that
/// tick's generation order.
pub fn generate_event_id(tick: u64, sequence: usize) -> String {
    format!("evt_{:06}_{:03}", tick, sequence)
}

/// One raw event produced by a subsystem during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Assigned by the engine once the tick's events are aggregated
    #[serde(default)]
    pub event_id: String,
    pub tick: u64,
    pub category: EventCategory,
    /// Name of the subsystem that produced the event
    pub subsystem: String,
    /// District of origin, if the event is spatially anchored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Narrative weight in [0, 1]
    pub severity: f32,
    pub headline: String,
}

impl SimEvent {
    /// Creates a new event. The id is assigned later by the engine.
    pub fn new(
        tick: u64,
        category: EventCategory,
        subsystem: impl Into<String>,
        severity: f32,
        headline: impl Into<String>,
    ) -> Self {
        Self {
            event_id: String::new(),
            tick,
            category,
            subsystem: subsystem.into(),
            district: None,
            severity: severity.clamp(0.0, 1.0),
            headline: headline.into(),
        }
    }

    /// Anchors the event to a district.
    pub fn in_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_format() {
        assert_eq!(generate_event_id(7, 3), "evt_000007_003");
        assert_eq!(generate_event_id(123456, 0), "evt_123456_000");
    }

    #[test]
    fn test_severity_clamped() {
        let event = SimEvent::new(0, EventCategory::Agent, "agents", 1.7, "overflow");
        assert_eq!(event.severity, 1.0);
        let event = SimEvent::new(0, EventCategory::Agent, "agents", -0.2, "underflow");
        assert_eq!(event.severity, 0.0);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&EventCategory::Environment).unwrap(),
            r#""environment""#
        );
        assert_eq!(
            serde_json::to_string(&EventCategory::Story).unwrap(),
            r#""story""#
        );
    }

    #[test]
    fn test_event_roundtrip() {
        let event = SimEvent::new(12, EventCategory::Faction, "factions", 0.6, "guilds consolidate")
            .in_district("market");
        let json = serde_json::to_string(&event).unwrap();
        let back: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
