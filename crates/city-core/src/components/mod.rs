//! Owned entities of the game state.

pub mod agent;
pub mod city;
pub mod economy;
pub mod environment;
pub mod faction;
pub mod progression;

pub use agent::Agent;
pub use city::{City, District};
pub use economy::Economy;
pub use environment::{Environment, EnvironmentDelta};
pub use faction::Faction;
pub use progression::{Milestone, Progression};

use serde::{Deserialize, Serialize};

/// Level-of-detail mode scaling event volume and volatility.
///
/// `Reduced` surfaces only severe events (performance sweeps), `Rich`
/// lowers the bar for narrative density tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LodMode {
    Reduced,
    #[default]
    Standard,
    Rich,
}

impl LodMode {
    /// Minimum severity a minor event needs before a subsystem emits it.
    pub fn minor_event_threshold(self) -> f32 {
        match self {
            LodMode::Reduced => 0.85,
            LodMode::Standard => 0.6,
            LodMode::Rich => 0.35,
        }
    }
}
