//! Game state and its typed metadata extensions.
//!
//! `GameState` is created once at initialization, mutated in place every
//! tick, and persisted via snapshot/restore. The `metadata` field is the
//! typed extension registry: a fixed set of named, subsystem-owned
//! sub-structures merged only at the serialization boundary, instead of a
//! stringly-keyed scratch map.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use city_events::{EventArchive, SimEvent, TimelineEntry};

use crate::components::{Agent, City, Economy, Environment, Faction, LodMode, Progression};

/// The complete mutable world state.
///
/// All entity maps are `BTreeMap` so iteration order, and therefore both
/// simulation behavior and serialized output, is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Monotone tick counter; only `restore` moves it backward
    pub tick: u64,
    pub city: City,
    pub factions: BTreeMap<String, Faction>,
    pub agents: BTreeMap<String, Agent>,
    pub environment: Environment,
    pub economy: Economy,
    pub progression: Progression,
    pub lod: LodMode,
    pub metadata: StateMetadata,
}

impl GameState {
    /// Clamps every bounded metric in the state back into [0, 1].
    pub fn clamp_all(&mut self) {
        for district in self.city.districts.values_mut() {
            district.clamp_modifiers();
        }
        for faction in self.factions.values_mut() {
            faction.clamp_metrics();
        }
        for agent in self.agents.values_mut() {
            agent.clamp_traits();
        }
        self.environment.clamp_metrics();
    }

    /// True when every bounded metric sits inside [0, 1].
    pub fn metrics_bounded(&self) -> bool {
        self.environment.metrics_bounded()
            && self.city.districts.values().all(|d| d.modifiers_bounded())
            && self
                .factions
                .values()
                .all(|f| (0.0..=1.0).contains(&f.legitimacy))
    }
}

/// Typed extension registry carried inside the game state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateMetadata {
    pub focus_state: FocusState,
    pub story_seeds: BTreeMap<String, StorySeedState>,
    pub explanations: ExplanationHistory,
    pub archive: EventArchive,
    /// Digest surfaced on the most recent tick
    #[serde(default)]
    pub last_digest: Vec<SimEvent>,
    /// Wall-clock profiling; runtime diagnostics only, never part of the
    /// canonical snapshot
    #[serde(skip)]
    pub profiling: ProfilingState,
}

/// Player focus and per-tick attention allocation counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FocusState {
    /// Focused district, or `None` for global attention
    pub focus: Option<String>,
    /// Static adjacency per district, built once from content
    pub adjacency: BTreeMap<String, Vec<String>>,
    /// Overwritten (never accumulated) each tick
    pub ring_events: usize,
    pub global_events: usize,
    pub archived: usize,
}

impl FocusState {
    /// District ids inside the current attention ring: the focused district
    /// plus its static neighbors. Empty when no focus is set.
    pub fn ring(&self) -> Vec<&str> {
        let Some(focus) = self.focus.as_deref() else {
            return Vec::new();
        };
        let mut ring = vec![focus];
        if let Some(neighbors) = self.adjacency.get(focus) {
            ring.extend(neighbors.iter().map(String::as_str));
        }
        ring
    }
}

/// Lifecycle phase of a story seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedPhase {
    #[default]
    Dormant,
    Active,
    Cooling,
}

/// Runtime state of one authored story seed. Created at load, mutated only
/// by the story director, never deleted during a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorySeedState {
    pub phase: SeedPhase,
    pub cooldown_remaining: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_triggered_tick: Option<u64>,
    /// Ticks left before a fixed-duration seed resolves
    pub remaining_duration: u64,
    /// Every activation tick, for offline balance tooling
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activations: Vec<u64>,
}

/// Bounded FIFO of explanation timeline entries plus the latest entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExplanationHistory {
    pub entries: VecDeque<TimelineEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<TimelineEntry>,
}

impl ExplanationHistory {
    /// Appends an entry, evicting the oldest beyond `limit`.
    pub fn push(&mut self, entry: TimelineEntry, limit: usize) {
        self.latest = Some(entry.clone());
        self.entries.push_back(entry);
        while self.entries.len() > limit {
            self.entries.pop_front();
        }
    }

    /// Most recent `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> Vec<&TimelineEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).collect()
    }
}

/// One profiling sample per completed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSample {
    pub tick: u64,
    pub duration: Duration,
    pub slowest_subsystem: String,
}

/// Rolling window of tick timings. Never serialized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfilingState {
    samples: VecDeque<TickSample>,
}

impl ProfilingState {
    /// Records one tick sample, keeping at most `window` samples.
    pub fn record(&mut self, sample: TickSample, window: usize) {
        self.samples.push_back(sample);
        while self.samples.len() > window {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// p50/p95/max tick duration in microseconds plus the subsystem that
    /// was slowest most often inside the window.
    pub fn summary(&self) -> ProfilingSummary {
        if self.samples.is_empty() {
            return ProfilingSummary::default();
        }
        let mut micros: Vec<u128> = self.samples.iter().map(|s| s.duration.as_micros()).collect();
        micros.sort_unstable();
        let percentile = |p: f64| -> u128 {
            let rank = ((micros.len() - 1) as f64 * p).round() as usize;
            micros[rank]
        };

        let mut slowest_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for sample in &self.samples {
            *slowest_counts.entry(sample.slowest_subsystem.as_str()).or_insert(0) += 1;
        }
        let slowest_subsystem = slowest_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| (*name).to_string())
            .unwrap_or_default();

        ProfilingSummary {
            samples: self.samples.len(),
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            max_us: *micros.last().unwrap_or(&0),
            slowest_subsystem,
        }
    }
}

/// Aggregated view over the profiling window.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfilingSummary {
    pub samples: usize,
    pub p50_us: u128,
    pub p95_us: u128,
    pub max_us: u128,
    pub slowest_subsystem: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_events::{CausalCategory, CausalEvent, EnvironmentSnapshot};

    fn make_entry(tick: u64) -> TimelineEntry {
        TimelineEntry {
            tick,
            events: vec![CausalEvent::new(tick, CausalCategory::Environment, "drift", 0.01)],
            agent_reasoning: Vec::new(),
            environment: EnvironmentSnapshot::default(),
            key_changes: Vec::new(),
        }
    }

    #[test]
    fn test_ring_without_focus_is_empty() {
        let focus = FocusState::default();
        assert!(focus.ring().is_empty());
    }

    #[test]
    fn test_ring_includes_focus_and_neighbors() {
        let mut focus = FocusState::default();
        focus.adjacency.insert("civic".to_string(), vec!["market".to_string()]);
        focus.focus = Some("civic".to_string());
        assert_eq!(focus.ring(), vec!["civic", "market"]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = ExplanationHistory::default();
        for tick in 0..7 {
            history.push(make_entry(tick), 3);
        }
        assert_eq!(history.entries.len(), 3);
        assert_eq!(history.entries.front().unwrap().tick, 4);
        assert_eq!(history.latest.as_ref().unwrap().tick, 6);
    }

    #[test]
    fn test_history_recent_order() {
        let mut history = ExplanationHistory::default();
        for tick in 0..5 {
            history.push(make_entry(tick), 10);
        }
        let recent = history.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tick, 3);
        assert_eq!(recent[1].tick, 4);
    }

    #[test]
    fn test_profiling_window_bounded() {
        let mut profiling = ProfilingState::default();
        for tick in 0..10 {
            profiling.record(
                TickSample {
                    tick,
                    duration: Duration::from_micros(100 + tick as u64),
                    slowest_subsystem: "agents".to_string(),
                },
                4,
            );
        }
        assert_eq!(profiling.len(), 4);
        let summary = profiling.summary();
        assert_eq!(summary.samples, 4);
        assert_eq!(summary.max_us, 109);
        assert_eq!(summary.slowest_subsystem, "agents");
    }

    #[test]
    fn test_metadata_profiling_not_serialized() {
        let mut metadata = StateMetadata::default();
        metadata.profiling.record(
            TickSample {
                tick: 0,
                duration: Duration::from_micros(5),
                slowest_subsystem: "economy".to_string(),
            },
            8,
        );
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("profiling"));
        let back: StateMetadata = serde_json::from_str(&json).unwrap();
        assert!(back.profiling.is_empty());
    }
}
