//! The tick orchestrator.
//!
//! `SimEngine` owns the game state and drives a fixed subsystem order every
//! tick: environment, economy, factions, agents, then the story director,
//! then progression. Each subsystem gets a fresh RNG derived from
//! `(base_seed, tick, subsystem_index)`, so a run is fully reproducible
//! from its seed and initial state.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use city_core::systems::{
    AgentSystem, EconomySystem, EnvironmentSystem, FactionSystem, ProgressionSystem,
};
use city_core::{
    subsystem_rng, EnvironmentDelta, GameState, ProfilingSummary, Subsystem, SubsystemOutput,
    TickSample, WorldDef,
};
use city_director::{
    AttentionBudget, DirectorFeed, ExplanationsManager, StoryDirector,
};
use city_events::{generate_event_id, EventArchive, TickReport, TimelineEntry};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// The story director runs once this many subsystems have completed, so its
/// triggers see post-agent state but progression sees story outcomes.
const DIRECTOR_SLOT: usize = 4;

/// Deterministic tick kernel over one city.
pub struct SimEngine {
    config: EngineConfig,
    world: WorldDef,
    subsystems: Vec<Box<dyn Subsystem>>,
    story: StoryDirector,
    attention: AttentionBudget,
    explanations: ExplanationsManager,
    state: Option<GameState>,
}

impl SimEngine {
    pub fn new(world: WorldDef, config: EngineConfig) -> Self {
        let subsystems: Vec<Box<dyn Subsystem>> = vec![
            Box::new(EnvironmentSystem),
            Box::new(EconomySystem),
            Box::new(FactionSystem),
            Box::new(AgentSystem),
            Box::new(ProgressionSystem),
        ];
        let story = StoryDirector::new(&world.seeds, &config.director);
        let attention = AttentionBudget::new(&config.director);
        let explanations = ExplanationsManager::new(&config.director);
        Self {
            config,
            world,
            subsystems,
            story,
            attention,
            explanations,
            state: None,
        }
    }

    /// Builds the initial state from the world definition. Must be called
    /// before any tick or query method.
    pub fn initialize_state(&mut self) {
        let mut state = self.world.build_state(self.config.lod);
        state.metadata.archive = EventArchive::new(
            self.config.director.archive_recent_window,
            self.config.director.archive_top_k,
        );
        tracing::info!(
            city = %state.city.name,
            districts = state.city.districts.len(),
            factions = state.factions.len(),
            agents = state.agents.len(),
            seeds = state.metadata.story_seeds.len(),
            "state initialized"
        );
        self.state = Some(state);
    }

    /// Replaces the current state with a previously captured snapshot.
    pub fn restore_snapshot(&mut self, snapshot: &str) -> Result<(), EngineError> {
        let state: GameState = serde_json::from_str(snapshot)?;
        tracing::info!(tick = state.tick, "state restored from snapshot");
        self.state = Some(state);
        Ok(())
    }

    /// Serializes the complete current state. Restoring the returned string
    /// reproduces the run exactly; profiling data is runtime-only and is
    /// not captured.
    pub fn snapshot(&self) -> Result<String, EngineError> {
        let state = self.state()?;
        Ok(serde_json::to_string(state)?)
    }

    pub fn state(&self) -> Result<&GameState, EngineError> {
        self.state.as_ref().ok_or(EngineError::Uninitialized)
    }

    pub fn state_mut(&mut self) -> Result<&mut GameState, EngineError> {
        self.state.as_mut().ok_or(EngineError::Uninitialized)
    }

    /// Runs `count` ticks and returns one report per completed tick.
    pub fn advance_ticks(&mut self, count: u64, base_seed: u64) -> Result<Vec<TickReport>, EngineError> {
        if count < 1 {
            return Err(EngineError::Validation(
                "tick count must be at least 1".to_string(),
            ));
        }
        if count > self.config.engine_max_ticks {
            return Err(EngineError::TickLimit {
                requested: count,
                limit: self.config.engine_max_ticks,
            });
        }

        let mut state = self.state.take().ok_or(EngineError::Uninitialized)?;
        let mut reports = Vec::with_capacity(count as usize);
        for _ in 0..count {
            reports.push(self.run_tick(&mut state, base_seed));
        }
        self.state = Some(state);
        Ok(reports)
    }

    /// Points attention at a district; its ring biases the digest.
    pub fn set_focus(&mut self, district_id: &str) -> Result<(), EngineError> {
        let state = self.state_mut()?;
        if !state.city.districts.contains_key(district_id) {
            return Err(EngineError::Validation(format!(
                "cannot focus unknown district '{}'",
                district_id
            )));
        }
        state.metadata.focus_state.focus = Some(district_id.to_string());
        Ok(())
    }

    /// Returns attention to global coverage.
    pub fn clear_focus(&mut self) -> Result<(), EngineError> {
        self.state_mut()?.metadata.focus_state.focus = None;
        Ok(())
    }

    /// Current focus and last-tick allocation counters.
    pub fn focus_state(&self) -> Result<&city_core::FocusState, EngineError> {
        Ok(&self.state()?.metadata.focus_state)
    }

    /// Seed statuses and recent activations for narrative consumers.
    pub fn director_feed(&self) -> Result<DirectorFeed, EngineError> {
        Ok(self.story.feed(self.state()?))
    }

    /// Seed activation counts for offline balance tooling.
    pub fn activation_report(&self) -> Result<serde_json::Value, EngineError> {
        Ok(self.story.activation_report(self.state()?))
    }

    /// Most recent `count` explanation timeline entries, oldest first.
    pub fn timeline(&self, count: usize) -> Result<Vec<TimelineEntry>, EngineError> {
        Ok(self.explanations.query_timeline(self.state()?, count))
    }

    pub fn explain_metric(&self, name: &str, lookback: usize) -> Result<serde_json::Value, EngineError> {
        Ok(self.explanations.explain_metric(self.state()?, name, lookback))
    }

    pub fn explain_district(&self, id: &str, lookback: usize) -> Result<serde_json::Value, EngineError> {
        Ok(self.explanations.explain_district(self.state()?, id, lookback))
    }

    pub fn explain_faction(&self, id: &str, lookback: usize) -> Result<serde_json::Value, EngineError> {
        Ok(self.explanations.explain_faction(self.state()?, id, lookback))
    }

    pub fn explain_agent(&self, id: &str, lookback: usize) -> Result<serde_json::Value, EngineError> {
        Ok(self.explanations.explain_agent(self.state()?, id, lookback))
    }

    /// Free-form "why" entry point.
    pub fn why(&self, query_text: &str) -> Result<serde_json::Value, EngineError> {
        Ok(self.explanations.why_summary(self.state()?, query_text))
    }

    pub fn progression_summary(&self) -> Result<serde_json::Value, EngineError> {
        Ok(serde_json::to_value(&self.state()?.progression)?)
    }

    /// Aggregated wall-clock timings over the profiling window.
    pub fn profiling_summary(&self) -> Result<ProfilingSummary, EngineError> {
        Ok(self.state()?.metadata.profiling.summary())
    }

    fn run_tick(&self, state: &mut GameState, base_seed: u64) -> TickReport {
        let tick = state.tick;
        let tick_start = Instant::now();

        let environment_before = state.environment.clone();
        let legitimacy_before: BTreeMap<String, f32> = state
            .factions
            .iter()
            .map(|(id, f)| (id.clone(), f.legitimacy))
            .collect();

        let mut output = SubsystemOutput::default();
        let mut slowest: (Duration, &'static str) = (Duration::ZERO, "");
        let mut story_outcome = None;

        for (index, subsystem) in self.subsystems.iter().enumerate() {
            if index == DIRECTOR_SLOT {
                let phase_start = Instant::now();
                let outcome = self.story.evaluate(state);
                output.events.extend(outcome.events.iter().cloned());
                let elapsed = phase_start.elapsed();
                if elapsed >= slowest.0 {
                    slowest = (elapsed, "story");
                }
                story_outcome = Some(outcome);
            }

            let mut rng = subsystem_rng(base_seed, tick, index as u64);
            let phase_start = Instant::now();
            output.merge(subsystem.tick(state, &mut rng));
            let elapsed = phase_start.elapsed();
            if elapsed >= slowest.0 {
                slowest = (elapsed, subsystem.name());
            }
        }
        let story_outcome = story_outcome.unwrap_or_default();

        // Event ids follow generation order within the tick.
        for (sequence, event) in output.events.iter_mut().enumerate() {
            event.event_id = generate_event_id(tick, sequence);
        }
        let raw_events = output.events.len();

        let metadata = &mut state.metadata;
        let digest = self.attention.allocate(
            std::mem::take(&mut output.events),
            &mut metadata.focus_state,
            &mut metadata.archive,
        );
        metadata.last_digest = digest.events.clone();

        let environment_delta = EnvironmentDelta::between(&environment_before, &state.environment);
        let mut faction_deltas = BTreeMap::new();
        for (id, faction) in &state.factions {
            let before = legitimacy_before.get(id).copied().unwrap_or(faction.legitimacy);
            faction_deltas.insert(id.clone(), faction.legitimacy - before);
        }
        let entry = self.explanations.record_tick(
            state,
            tick,
            &environment_delta,
            &faction_deltas,
            &output.agent_actions,
            &output.faction_actions,
        );

        state.clamp_all();

        state.metadata.profiling.record(
            TickSample {
                tick,
                duration: tick_start.elapsed(),
                slowest_subsystem: slowest.1.to_string(),
            },
            self.config.history_window,
        );

        let report = TickReport {
            tick,
            digest: digest.events,
            ring_events: digest.ring_events,
            global_events: digest.global_events,
            archived: digest.archived,
            raw_events,
            seed_activations: story_outcome.activated,
            seed_resolutions: story_outcome.resolved,
            causal_events: entry.events.len(),
        };
        tracing::debug!(
            tick,
            raw = report.raw_events,
            surfaced = report.ring_events + report.global_events,
            archived = report.archived,
            "tick complete"
        );

        state.tick = tick + 1;
        report
    }
}
