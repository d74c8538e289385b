//! Faction state.

use serde::{Deserialize, Serialize};

use crate::clamp01;

/// A faction contending for influence over the city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub faction_id: String,
    pub name: String,
    /// Public standing in [0, 1]
    pub legitimacy: f32,
    /// District ids this faction holds, in claim order
    #[serde(default)]
    pub territory: Vec<String>,
    /// Abstract resource reserve, never negative
    pub resources: f32,
}

impl Faction {
    /// Clamps legitimacy into [0, 1] and floors resources at zero.
    pub fn clamp_metrics(&mut self) {
        self.legitimacy = clamp01(self.legitimacy);
        self.resources = self.resources.max(0.0);
    }

    /// True if the faction holds the given district.
    pub fn controls(&self, district_id: &str) -> bool {
        self.territory.iter().any(|d| d == district_id)
    }
}
