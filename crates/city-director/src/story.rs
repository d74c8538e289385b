//! Story seed director.
//!
//! A per-seed finite-state machine over authored seed definitions. Runs at
//! tick end, after environment/faction/agent updates, so triggers see
//! post-tick values. Dormant seeds activate when their trigger holds and
//! their cooldown has expired; active seeds resolve single-shot or after a
//! fixed duration, then cool down one decrement per tick.

use std::collections::BTreeMap;

use serde::Serialize;

use city_core::{GameState, SeedDef, SeedPhase};
use city_events::{EventCategory, SimEvent};

use crate::config::DirectorConfig;

/// What the director did in one tick.
#[derive(Debug, Clone, Default)]
pub struct StoryTickOutcome {
    pub events: Vec<SimEvent>,
    /// Seed ids activated this tick, in activation order
    pub activated: Vec<String>,
    /// Seed ids resolved this tick
    pub resolved: Vec<String>,
}

/// Evaluates seed triggers and drives per-seed state.
#[derive(Debug, Clone)]
pub struct StoryDirector {
    seeds: BTreeMap<String, SeedDef>,
    feed_recent_window: usize,
}

impl StoryDirector {
    pub fn new(seeds: &[SeedDef], config: &DirectorConfig) -> Self {
        Self {
            seeds: seeds.iter().map(|s| (s.id.clone(), s.clone())).collect(),
            feed_recent_window: config.feed_recent_window,
        }
    }

    /// Runs one tick of the seed state machines against post-tick state.
    pub fn evaluate(&self, state: &mut GameState) -> StoryTickOutcome {
        let tick = state.tick;
        let mut outcome = StoryTickOutcome::default();

        // Phase upkeep first: cooling seeds tick down (one decrement per
        // tick), fixed-duration active seeds count toward resolution.
        for (seed_id, seed_state) in state.metadata.story_seeds.iter_mut() {
            let Some(def) = self.seeds.get(seed_id) else {
                continue;
            };
            match seed_state.phase {
                SeedPhase::Cooling => {
                    seed_state.cooldown_remaining = seed_state.cooldown_remaining.saturating_sub(1);
                    if seed_state.cooldown_remaining == 0 {
                        seed_state.phase = SeedPhase::Dormant;
                    }
                }
                SeedPhase::Active => {
                    seed_state.remaining_duration = seed_state.remaining_duration.saturating_sub(1);
                    if seed_state.remaining_duration == 0 {
                        seed_state.phase = SeedPhase::Cooling;
                        seed_state.cooldown_remaining = def.cooldown_ticks;
                        outcome.resolved.push(seed_id.clone());
                        outcome.events.push(SimEvent::new(
                            tick,
                            EventCategory::Story,
                            "story",
                            0.6,
                            format!("seed resolved: {}", def.resolution),
                        ));
                    }
                }
                SeedPhase::Dormant => {}
            }
        }

        // Eligibility, ordered by priority descending then id ascending,
        // never by iteration order of anything unordered.
        let mut eligible: Vec<&SeedDef> = self
            .seeds
            .values()
            .filter(|def| {
                state
                    .metadata
                    .story_seeds
                    .get(&def.id)
                    .is_some_and(|s| s.phase == SeedPhase::Dormant && s.cooldown_remaining == 0)
                    && def.trigger.satisfied(state)
            })
            .collect();
        eligible.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

        for def in eligible {
            let Some(seed_state) = state.metadata.story_seeds.get_mut(&def.id) else {
                continue;
            };
            seed_state.last_triggered_tick = Some(tick);
            seed_state.activations.push(tick);
            outcome.activated.push(def.id.clone());

            let severity = (0.5 + def.priority as f32 / 200.0).min(1.0);
            outcome.events.push(SimEvent::new(
                tick,
                EventCategory::Story,
                "story",
                severity,
                format!("seed activated: {}", def.headline),
            ));
            tracing::debug!(seed = %def.id, tick, "story seed activated");

            if def.duration_ticks == 0 {
                // Single-shot: resolves within its activation tick.
                seed_state.phase = SeedPhase::Cooling;
                seed_state.cooldown_remaining = def.cooldown_ticks;
                outcome.resolved.push(def.id.clone());
                outcome.events.push(SimEvent::new(
                    tick,
                    EventCategory::Story,
                    "story",
                    0.6,
                    format!("seed resolved: {}", def.resolution),
                ));
            } else {
                seed_state.phase = SeedPhase::Active;
                seed_state.remaining_duration = def.duration_ticks;
            }
        }

        outcome
    }

    /// Snapshot of every seed plus recent activations, for narrative
    /// consumers layered above the kernel.
    pub fn feed(&self, state: &GameState) -> DirectorFeed {
        let seeds = state
            .metadata
            .story_seeds
            .iter()
            .map(|(seed_id, s)| SeedStatus {
                seed_id: seed_id.clone(),
                phase: s.phase,
                cooldown_remaining: s.cooldown_remaining,
                last_triggered_tick: s.last_triggered_tick,
                activation_count: s.activations.len(),
            })
            .collect();

        let mut recent: Vec<SeedActivation> = state
            .metadata
            .story_seeds
            .iter()
            .flat_map(|(seed_id, s)| {
                s.activations.iter().map(move |tick| SeedActivation {
                    seed_id: seed_id.clone(),
                    tick: *tick,
                })
            })
            .collect();
        recent.sort_by(|a, b| a.tick.cmp(&b.tick).then_with(|| a.seed_id.cmp(&b.seed_id)));
        let skip = recent.len().saturating_sub(self.feed_recent_window);
        let recent_activations = recent.split_off(skip);

        DirectorFeed {
            tick: state.tick,
            seeds,
            recent_activations,
        }
    }

    /// Activation report for offline balance tooling: which seeds never
    /// fired, and how often the others did.
    pub fn activation_report(&self, state: &GameState) -> serde_json::Value {
        let mut counts = serde_json::Map::new();
        let mut never_triggered = Vec::new();
        for seed_id in self.seeds.keys() {
            let count = state
                .metadata
                .story_seeds
                .get(seed_id)
                .map_or(0, |s| s.activations.len());
            if count == 0 {
                never_triggered.push(seed_id.clone());
            }
            counts.insert(seed_id.clone(), count.into());
        }
        serde_json::json!({
            "counts": counts,
            "never_triggered": never_triggered,
        })
    }
}

/// Status of one seed in the director feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedStatus {
    pub seed_id: String,
    pub phase: SeedPhase,
    pub cooldown_remaining: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_triggered_tick: Option<u64>,
    pub activation_count: usize,
}

/// One historical activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedActivation {
    pub seed_id: String,
    pub tick: u64,
}

/// Everything a narrative layer needs from the director each tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorFeed {
    pub tick: u64,
    pub seeds: Vec<SeedStatus>,
    pub recent_activations: Vec<SeedActivation>,
}
