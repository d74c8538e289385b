//! Gameplay subsystem implementations.
//!
//! Each satisfies the simple `Subsystem` contract; all the hard ordering
//! and reproducibility guarantees live in the engine and services, not
//! here.

pub mod agents;
pub mod economy;
pub mod environment;
pub mod factions;
pub mod progression;

pub use agents::AgentSystem;
pub use economy::EconomySystem;
pub use environment::EnvironmentSystem;
pub use factions::FactionSystem;
pub use progression::ProgressionSystem;
