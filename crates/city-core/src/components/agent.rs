//! Agent state.

use serde::{Deserialize, Serialize};

use crate::clamp01;

/// A named inhabitant acting in the city each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    pub name: String,
    pub faction: String,
    /// Current district
    pub district: String,
    pub role: String,
    /// Drive toward disruptive action, in [0, 1]
    pub ambition: f32,
    /// General outlook in [0, 1]; low morale biases toward unrest
    pub morale: f32,
}

impl Agent {
    /// Clamps bounded traits back into [0, 1].
    pub fn clamp_traits(&mut self) {
        self.ambition = clamp01(self.ambition);
        self.morale = clamp01(self.morale);
    }
}
