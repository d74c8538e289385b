//! Progression state: score and milestones.

use serde::{Deserialize, Serialize};

/// A milestone reached by the city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub milestone_id: String,
    pub tick: u64,
    pub description: String,
}

/// Long-horizon progression of the simulated city.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Progression {
    /// Accumulated progression score
    pub score: f32,
    /// Consecutive ticks with mean prosperity above the milestone bar
    pub prosperity_streak: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<Milestone>,
}

impl Progression {
    /// True once a milestone id has been reached; milestones fire once.
    pub fn reached(&self, milestone_id: &str) -> bool {
        self.milestones.iter().any(|m| m.milestone_id == milestone_id)
    }

    /// Records a milestone if it has not fired before. Returns whether it
    /// was newly recorded.
    pub fn record(&mut self, milestone_id: &str, tick: u64, description: &str) -> bool {
        if self.reached(milestone_id) {
            return false;
        }
        self.milestones.push(Milestone {
            milestone_id: milestone_id.to_string(),
            tick,
            description: description.to_string(),
        });
        true
    }
}
