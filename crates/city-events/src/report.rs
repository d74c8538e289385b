//! Per-tick report handed back to callers of `advance_ticks`.

use serde::{Deserialize, Serialize};

use crate::event::SimEvent;

/// Everything a caller learns about one completed tick.
///
/// Reports carry no wall-clock data: two runs with the same seed and
/// initial state produce identical report sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    /// Budgeted, ranked events surfaced to the player this tick
    pub digest: Vec<SimEvent>,
    /// Surfaced events whose origin was inside the focus ring
    pub ring_events: usize,
    /// Surfaced events from outside the focus ring
    pub global_events: usize,
    /// Events beyond the budget, moved to the archive
    pub archived: usize,
    /// Total raw events generated this tick
    pub raw_events: usize,
    /// Story seeds that activated this tick, in activation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_activations: Vec<String>,
    /// Story seeds that resolved this tick
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_resolutions: Vec<String>,
    /// Causal events recorded on the explanations timeline this tick
    pub causal_events: usize,
}

impl TickReport {
    /// Budget conservation: surfaced plus archived must equal raw.
    pub fn budget_balanced(&self) -> bool {
        self.ring_events + self.global_events + self.archived == self.raw_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_balanced() {
        let report = TickReport {
            tick: 3,
            digest: Vec::new(),
            ring_events: 4,
            global_events: 0,
            archived: 6,
            raw_events: 10,
            seed_activations: Vec::new(),
            seed_resolutions: Vec::new(),
            causal_events: 2,
        };
        assert!(report.budget_balanced());
    }

    #[test]
    fn test_budget_unbalanced() {
        let report = TickReport {
            tick: 3,
            digest: Vec::new(),
            ring_events: 4,
            global_events: 1,
            archived: 6,
            raw_events: 10,
            seed_activations: Vec::new(),
            seed_resolutions: Vec::new(),
            causal_events: 0,
        };
        assert!(!report.budget_balanced());
    }
}
