//! Orchestration services around the tick kernel.
//!
//! Three services sit between raw subsystem output and the caller:
//!
//! - [`attention`]: the per-tick attention budget that turns raw events
//!   into a bounded, ring-biased digest plus an archive
//! - [`story`]: the story-seed director, a per-seed trigger/cooldown
//!   state machine
//! - [`explain`]: the explanations recorder and its "why did X change?"
//!   query surface
//!
//! All three are stateless logic over `GameState`; everything they need to
//! persist lives in the state's typed metadata, so snapshot/restore covers
//! them for free.

pub mod attention;
pub mod config;
pub mod explain;
pub mod story;

pub use attention::{AttentionBudget, Digest};
pub use config::{ConfigError, DirectorConfig};
pub use explain::ExplanationsManager;
pub use story::{DirectorFeed, SeedActivation, SeedStatus, StoryDirector, StoryTickOutcome};
