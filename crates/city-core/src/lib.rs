//! Core simulation data model and gameplay subsystems.
//!
//! Owns `GameState` and everything inside it, the `Subsystem` contract the
//! engine dispatches through, the per-tick RNG derivation, and the static
//! world content the state is initialized from.

pub mod components;
pub mod content;
pub mod rng;
pub mod state;
pub mod subsystem;
pub mod systems;

pub use components::{
    Agent, City, District, Economy, Environment, EnvironmentDelta, Faction, LodMode, Progression,
};
pub use content::{Comparator, SeedDef, Trigger, WorldDef};
pub use rng::{subsystem_rng, subsystem_seed, weighted_select};
pub use state::{
    ExplanationHistory, FocusState, GameState, ProfilingState, ProfilingSummary, SeedPhase,
    StateMetadata, StorySeedState, TickSample,
};
pub use subsystem::{
    AgentAction, AgentActionKind, FactionAction, FactionActionKind, Subsystem, SubsystemOutput,
};

/// Clamps a bounded metric into [0, 1].
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
