//! Shared event and report types for the city simulation kernel.
//!
//! Everything that crosses a crate boundary lives here: raw subsystem
//! events, the bounded event archive, causal events and timeline entries
//! produced by the explanations layer, and the per-tick report handed back
//! to callers. All types serialize with stable field ordering so identical
//! runs produce byte-identical JSON.

pub mod archive;
pub mod causal;
pub mod event;
pub mod report;

pub use archive::EventArchive;
pub use causal::{CausalCategory, CausalEvent, EnvironmentSnapshot, TimelineEntry};
pub use event::{generate_event_id, EventCategory, SimEvent};
pub use report::TickReport;
