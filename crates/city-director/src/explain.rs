//! Explanations recorder and "why" query surface.
//!
//! Converts per-tick deltas and actions into causal events on a bounded
//! timeline, then answers "why did X change?" through a small fixed rule
//! table, not natural-language understanding. Unknown ids in
//! the read-only queries are routine lookups, so they come back as
//! structured `{"error": ...}` values rather than errors.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use city_core::{
    AgentAction, AgentActionKind, EnvironmentDelta, FactionAction, FactionActionKind, GameState,
};
use city_events::{CausalCategory, CausalEvent, TimelineEntry};

use crate::config::DirectorConfig;

/// Smallest delta worth a causal event.
const DELTA_EPSILON: f32 = 0.005;

/// Metric names the query surface understands.
pub const METRIC_VOCABULARY: [&str; 8] = [
    "stability",
    "unrest",
    "pollution",
    "biodiversity",
    "prosperity",
    "security",
    "legitimacy",
    "prices",
];

/// Records causal history and serves explanation queries.
#[derive(Debug, Clone)]
pub struct ExplanationsManager {
    history_limit: usize,
    why_lookback: usize,
}

impl ExplanationsManager {
    pub fn new(config: &DirectorConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            why_lookback: config.why_lookback,
        }
    }

    /// Converts one tick's deltas and actions into a timeline entry,
    /// appends it to the bounded history, and mirrors it into state
    /// metadata for persistence.
    pub fn record_tick(
        &self,
        state: &mut GameState,
        tick: u64,
        environment_delta: &EnvironmentDelta,
        faction_deltas: &BTreeMap<String, f32>,
        agent_actions: &[AgentAction],
        faction_actions: &[FactionAction],
    ) -> TimelineEntry {
        let mut events = Vec::new();

        for (metric, delta) in environment_delta.named() {
            if delta.abs() < DELTA_EPSILON {
                continue;
            }
            let direction = if delta > 0.0 { "rose" } else { "fell" };
            let mut event = CausalEvent::new(
                tick,
                CausalCategory::Environment,
                format!("environment {} {} by {:.3}", metric, direction, delta.abs()),
                delta,
            )
            .with_metadata("metric", metric)
            .with_cause(environment_cause(state, metric, delta));
            for effect in environment_effects(metric, delta) {
                event = event.with_effect(*effect);
            }
            events.push(event);
        }

        for (faction_id, delta) in faction_deltas {
            if delta.abs() < DELTA_EPSILON {
                continue;
            }
            let name = state
                .factions
                .get(faction_id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| faction_id.clone());
            let mut event = CausalEvent::new(
                tick,
                CausalCategory::Faction,
                format!("{} legitimacy shifted {:+.3}", name, delta),
                *delta,
            )
            .for_entity(faction_id.clone(), name)
            .with_metadata("metric", "legitimacy")
            .with_effect("public standing");
            for action in faction_actions.iter().filter(|a| &a.faction_id == faction_id) {
                event = event.with_cause(faction_cause(action.kind));
            }
            events.push(event);
        }

        for action in faction_actions {
            let name = state
                .factions
                .get(&action.faction_id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| action.faction_id.clone());
            let mut event = CausalEvent::new(
                tick,
                CausalCategory::Faction,
                format!("{} {}", name, faction_verb(action.kind)),
                action.magnitude,
            )
            .for_entity(action.faction_id.clone(), name)
            .with_cause(faction_cause(action.kind));
            for effect in faction_effects(action.kind) {
                event = event.with_effect(*effect);
            }
            if let Some(district) = &action.district {
                event = event.with_metadata("district", district.clone());
            }
            events.push(event);
        }

        let mut agent_reasoning = Vec::with_capacity(agent_actions.len());
        for action in agent_actions {
            let name = state
                .agents
                .get(&action.agent_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| action.agent_id.clone());
            let mut event = CausalEvent::new(
                tick,
                CausalCategory::Agent,
                format!("{} {}", name, agent_verb(action.kind)),
                0.0,
            )
            .for_entity(action.agent_id.clone(), name)
            .with_cause(action.reasoning.clone())
            .with_metadata("district", action.district.clone());
            for effect in agent_effects(action.kind) {
                event = event.with_effect(*effect);
            }
            events.push(event);
            agent_reasoning.push(action.reasoning.clone());
        }

        let mut ranked: Vec<&CausalEvent> = events.iter().collect();
        ranked.sort_by(|a, b| {
            b.delta
                .abs()
                .total_cmp(&a.delta.abs())
                .then_with(|| a.description.cmp(&b.description))
        });
        let key_changes = ranked
            .iter()
            .take(3)
            .filter(|e| e.delta.abs() >= DELTA_EPSILON)
            .map(|e| e.description.clone())
            .collect();

        let entry = TimelineEntry {
            tick,
            events,
            agent_reasoning,
            environment: state.environment.snapshot(),
            key_changes,
        };
        state
            .metadata
            .explanations
            .push(entry.clone(), self.history_limit);
        entry
    }

    /// Most recent `count` timeline entries, oldest first.
    pub fn query_timeline(&self, state: &GameState, count: usize) -> Vec<TimelineEntry> {
        state
            .metadata
            .explanations
            .recent(count)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Aggregates recent deltas of one metric into a cause list.
    pub fn explain_metric(&self, state: &GameState, name: &str, lookback: usize) -> Value {
        if !METRIC_VOCABULARY.contains(&name) {
            return json!({
                "error": format!("unknown metric '{}'", name),
                "known_metrics": METRIC_VOCABULARY,
            });
        }

        let mut net_delta = 0.0_f32;
        let mut matched = 0usize;
        let mut causes: Vec<String> = Vec::new();
        for entry in state.metadata.explanations.recent(lookback) {
            for event in &entry.events {
                let metric_match = event.metadata.get("metric").map(String::as_str) == Some(name);
                let effect_match = event.effects.iter().any(|e| e.contains(name));
                if !metric_match && !effect_match {
                    continue;
                }
                matched += 1;
                if metric_match {
                    net_delta += event.delta;
                }
                for cause in &event.causes {
                    if !causes.contains(cause) {
                        causes.push(cause.clone());
                    }
                }
            }
        }

        // Rule layer on current state, independent of what was recorded.
        if name == "unrest" && state.city.mean_unrest() > 0.5 {
            push_unique(&mut causes, "high district unrest");
        }
        if name == "pollution" && state.city.mean_pollution() > 0.5 {
            push_unique(&mut causes, "industrial pollution load");
        }
        if name == "stability" && state.environment.unrest > 0.5 {
            push_unique(&mut causes, "sustained unrest pressure");
        }

        json!({
            "metric": name,
            "lookback": lookback,
            "matched_events": matched,
            "net_delta": net_delta,
            "causes": causes,
            "current": current_metric_value(state, name),
        })
    }

    /// Entity-scoped explanation for a district.
    pub fn explain_district(&self, state: &GameState, id: &str, lookback: usize) -> Value {
        let Some(district) = state.city.districts.get(id) else {
            return json!({ "error": format!("unknown district id '{}'", id) });
        };
        let recent = self.entity_events(state, lookback, |e| {
            e.metadata.get("district").map(String::as_str) == Some(id)
        });
        json!({
            "district": district,
            "recent_events": recent,
        })
    }

    /// Entity-scoped explanation for a faction.
    pub fn explain_faction(&self, state: &GameState, id: &str, lookback: usize) -> Value {
        let Some(faction) = state.factions.get(id) else {
            return json!({ "error": format!("unknown faction id '{}'", id) });
        };
        let recent = self.entity_events(state, lookback, |e| {
            e.entity_id.as_deref() == Some(id)
        });
        json!({
            "faction": faction,
            "recent_events": recent,
        })
    }

    /// Entity-scoped explanation for an agent.
    pub fn explain_agent(&self, state: &GameState, id: &str, lookback: usize) -> Value {
        let Some(agent) = state.agents.get(id) else {
            return json!({ "error": format!("unknown agent id '{}'", id) });
        };
        let recent = self.entity_events(state, lookback, |e| {
            e.entity_id.as_deref() == Some(id)
        });
        json!({
            "agent": agent,
            "recent_events": recent,
        })
    }

    /// Routes a free-form "why" query through an ordered matcher table:
    /// district names, faction names, agent names, then the fixed metric
    /// vocabulary. First match wins.
    pub fn why_summary(&self, state: &GameState, query_text: &str) -> Value {
        let query = query_text.to_lowercase();
        let lookback = self.why_lookback;

        for (id, district) in &state.city.districts {
            if query.contains(&id.to_lowercase()) || query.contains(&district.name.to_lowercase()) {
                return json!({
                    "matched": true,
                    "kind": "district",
                    "subject": id,
                    "answer": self.explain_district(state, id, lookback),
                });
            }
        }
        for (id, faction) in &state.factions {
            if query.contains(&id.to_lowercase()) || query.contains(&faction.name.to_lowercase()) {
                return json!({
                    "matched": true,
                    "kind": "faction",
                    "subject": id,
                    "answer": self.explain_faction(state, id, lookback),
                });
            }
        }
        for (id, agent) in &state.agents {
            if query.contains(&id.to_lowercase()) || query.contains(&agent.name.to_lowercase()) {
                return json!({
                    "matched": true,
                    "kind": "agent",
                    "subject": id,
                    "answer": self.explain_agent(state, id, lookback),
                });
            }
        }
        for metric in METRIC_VOCABULARY {
            if query.contains(metric) {
                return json!({
                    "matched": true,
                    "kind": "metric",
                    "subject": metric,
                    "answer": self.explain_metric(state, metric, lookback),
                });
            }
        }

        json!({
            "matched": false,
            "suggestion": "ask about a district, faction, or agent by name, or a metric such as unrest, stability, or pollution",
        })
    }

    fn entity_events(
        &self,
        state: &GameState,
        lookback: usize,
        predicate: impl Fn(&CausalEvent) -> bool,
    ) -> Vec<CausalEvent> {
        state
            .metadata
            .explanations
            .recent(lookback)
            .into_iter()
            .flat_map(|entry| entry.events.iter())
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

fn push_unique(causes: &mut Vec<String>, cause: &str) {
    if !causes.iter().any(|c| c == cause) {
        causes.push(cause.to_string());
    }
}

fn current_metric_value(state: &GameState, name: &str) -> Value {
    match name {
        "stability" => json!(state.environment.stability),
        "unrest" => json!(state.environment.unrest),
        "pollution" => json!(state.environment.pollution),
        "biodiversity" => json!(state.environment.biodiversity),
        "prosperity" => json!(state.city.mean_prosperity()),
        "security" => json!(state.city.mean_security()),
        "legitimacy" => {
            let factions = &state.factions;
            if factions.is_empty() {
                json!(0.0)
            } else {
                let mean: f32 =
                    factions.values().map(|f| f.legitimacy).sum::<f32>() / factions.len() as f32;
                json!(mean)
            }
        }
        "prices" => json!(state.economy.prices),
        _ => Value::Null,
    }
}

/// Heuristic cause label for an environment metric delta.
fn environment_cause(state: &GameState, metric: &str, delta: f32) -> String {
    match (metric, delta > 0.0) {
        ("unrest", true) if state.city.mean_unrest() > 0.5 => "high district unrest".to_string(),
        ("unrest", true) => "street-level friction".to_string(),
        ("unrest", false) => "suppression and mediation".to_string(),
        ("pollution", true) if state.city.mean_pollution() > 0.5 => {
            "industrial pollution load".to_string()
        }
        ("pollution", true) => "urban emissions".to_string(),
        ("pollution", false) => "district investment and natural decay".to_string(),
        ("stability", true) => "calm streets".to_string(),
        ("stability", false) => "unrest pressure on institutions".to_string(),
        ("biodiversity", true) => "green recovery".to_string(),
        ("biodiversity", false) => "pollution pressure".to_string(),
        _ => "background drift".to_string(),
    }
}

fn environment_effects(metric: &str, delta: f32) -> &'static [&'static str] {
    match (metric, delta > 0.0) {
        ("unrest", true) => &["stability pressure"],
        ("unrest", false) => &["stability relief"],
        ("pollution", true) => &["biodiversity pressure"],
        ("pollution", false) => &["biodiversity relief"],
        ("stability", _) => &["public confidence"],
        ("biodiversity", _) => &["long-term resilience"],
        _ => &[],
    }
}

fn faction_verb(kind: FactionActionKind) -> &'static str {
    match kind {
        FactionActionKind::InvestDistrict => "invested in public works",
        FactionActionKind::SuppressUnrest => "moved to suppress unrest",
        FactionActionKind::Consolidate => "consolidated its standing",
        FactionActionKind::ExpandTerritory => "expanded its territory",
        FactionActionKind::Stockpile => "stockpiled resources",
    }
}

fn faction_cause(kind: FactionActionKind) -> &'static str {
    match kind {
        FactionActionKind::InvestDistrict => "district pollution and flagging prosperity",
        FactionActionKind::SuppressUnrest => "district unrest above tolerance",
        FactionActionKind::Consolidate => "flagging public standing",
        FactionActionKind::ExpandTerritory => "ambition to grow",
        FactionActionKind::Stockpile => "lean reserves",
    }
}

fn faction_effects(kind: FactionActionKind) -> &'static [&'static str] {
    match kind {
        FactionActionKind::InvestDistrict => &["pollution relief", "prosperity growth"],
        FactionActionKind::SuppressUnrest => &["unrest reduced", "legitimacy strain"],
        FactionActionKind::Consolidate => &["legitimacy gain"],
        FactionActionKind::ExpandTerritory => &["territory growth", "legitimacy strain"],
        FactionActionKind::Stockpile => &["reserves growth"],
    }
}

fn agent_verb(kind: AgentActionKind) -> &'static str {
    match kind {
        AgentActionKind::Work => "kept to steady work",
        AgentActionKind::Organize => "organized the neighborhood",
        AgentActionKind::Agitate => "stirred up the streets",
        AgentActionKind::Mediate => "mediated local disputes",
        AgentActionKind::Relocate => "moved to a calmer district",
    }
}

fn agent_effects(kind: AgentActionKind) -> &'static [&'static str] {
    match kind {
        AgentActionKind::Work => &["prosperity growth"],
        AgentActionKind::Organize => &["unrest reduced", "security growth"],
        AgentActionKind::Agitate => &["unrest growth"],
        AgentActionKind::Mediate => &["unrest reduced"],
        AgentActionKind::Relocate => &["population shift"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_core::{LodMode, WorldDef};

    fn manager(limit: usize) -> ExplanationsManager {
        ExplanationsManager::new(&DirectorConfig {
            history_limit: limit,
            ..DirectorConfig::default()
        })
    }

    fn make_state() -> GameState {
        WorldDef::default_world().build_state(LodMode::Standard)
    }

    fn unrest_delta(amount: f32) -> EnvironmentDelta {
        EnvironmentDelta {
            unrest: amount,
            ..EnvironmentDelta::default()
        }
    }

    fn agent_action(agent_id: &str, district: &str) -> AgentAction {
        AgentAction {
            agent_id: agent_id.to_string(),
            kind: AgentActionKind::Agitate,
            district: district.to_string(),
            reasoning: format!("unrest pushed {} toward agitation", agent_id),
        }
    }

    #[test]
    fn test_record_tick_builds_causal_events() {
        let manager = manager(10);
        let mut state = make_state();
        let faction_actions = vec![FactionAction {
            faction_id: "syndicate".to_string(),
            kind: FactionActionKind::InvestDistrict,
            district: Some("docks".to_string()),
            magnitude: 0.06,
        }];
        let agent_actions = vec![agent_action("renna", "docks")];
        let mut faction_deltas = BTreeMap::new();
        faction_deltas.insert("syndicate".to_string(), -0.02_f32);

        let entry = manager.record_tick(
            &mut state,
            3,
            &unrest_delta(0.05),
            &faction_deltas,
            &agent_actions,
            &faction_actions,
        );

        assert_eq!(entry.tick, 3);
        assert!(entry
            .events
            .iter()
            .any(|e| e.category == CausalCategory::Environment));
        assert!(entry
            .events
            .iter()
            .any(|e| e.category == CausalCategory::Agent));
        let invest = entry
            .events
            .iter()
            .find(|e| e.description.contains("invested"))
            .unwrap();
        assert!(invest.effects.contains(&"pollution relief".to_string()));
        assert_eq!(entry.agent_reasoning.len(), 1);
        assert_eq!(state.metadata.explanations.entries.len(), 1);
    }

    #[test]
    fn test_tiny_deltas_are_skipped() {
        let manager = manager(10);
        let mut state = make_state();
        let entry = manager.record_tick(
            &mut state,
            0,
            &unrest_delta(0.001),
            &BTreeMap::new(),
            &[],
            &[],
        );
        assert!(entry.events.is_empty());
        assert!(entry.key_changes.is_empty());
    }

    #[test]
    fn test_history_bounded_to_limit() {
        let manager = manager(5);
        let mut state = make_state();
        for tick in 0..12 {
            manager.record_tick(
                &mut state,
                tick,
                &unrest_delta(0.05),
                &BTreeMap::new(),
                &[],
                &[],
            );
        }
        let timeline = manager.query_timeline(&state, 12);
        assert_eq!(timeline.len(), 5);
        assert_eq!(timeline.last().unwrap().tick, 11);
        assert_eq!(timeline.first().unwrap().tick, 7);
    }

    #[test]
    fn test_explain_metric_aggregates_deltas() {
        let manager = manager(10);
        let mut state = make_state();
        for tick in 0..4 {
            manager.record_tick(
                &mut state,
                tick,
                &unrest_delta(0.05),
                &BTreeMap::new(),
                &[],
                &[],
            );
        }
        let answer = manager.explain_metric(&state, "unrest", 10);
        assert_eq!(answer["metric"], "unrest");
        assert!(answer["net_delta"].as_f64().unwrap() > 0.15);
        assert!(!answer["causes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_explain_metric_unknown_is_error_value() {
        let manager = manager(10);
        let state = make_state();
        let answer = manager.explain_metric(&state, "weather", 10);
        assert!(answer["error"].as_str().unwrap().contains("weather"));
    }

    #[test]
    fn test_explain_unknown_entities_are_error_values() {
        let manager = manager(10);
        let state = make_state();
        assert!(manager.explain_district(&state, "atlantis", 5)["error"]
            .as_str()
            .is_some());
        assert!(manager.explain_faction(&state, "nobody", 5)["error"]
            .as_str()
            .is_some());
        assert!(manager.explain_agent(&state, "ghost", 5)["error"]
            .as_str()
            .is_some());
    }

    #[test]
    fn test_explain_agent_joins_recent_actions() {
        let manager = manager(10);
        let mut state = make_state();
        manager.record_tick(
            &mut state,
            0,
            &EnvironmentDelta::default(),
            &BTreeMap::new(),
            &[agent_action("renna", "docks")],
            &[],
        );
        let answer = manager.explain_agent(&state, "renna", 5);
        assert_eq!(answer["agent"]["agent_id"], "renna");
        assert_eq!(answer["recent_events"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_why_routes_in_order() {
        let manager = manager(10);
        let state = make_state();

        let answer = manager.why_summary(&state, "why is the docks so tense?");
        assert_eq!(answer["matched"], true);
        assert_eq!(answer["kind"], "district");
        assert_eq!(answer["subject"], "docks");

        let answer = manager.why_summary(&state, "what is the Harbor Syndicate doing?");
        assert_eq!(answer["kind"], "faction");
        assert_eq!(answer["subject"], "syndicate");

        let answer = manager.why_summary(&state, "what happened to Renna?");
        assert_eq!(answer["kind"], "agent");
        assert_eq!(answer["subject"], "renna");

        let answer = manager.why_summary(&state, "why did unrest spike?");
        assert_eq!(answer["kind"], "metric");
        assert_eq!(answer["subject"], "unrest");
    }

    #[test]
    fn test_every_vocabulary_metric_reports_a_current_value() {
        let manager = manager(10);
        let state = make_state();
        for metric in METRIC_VOCABULARY {
            let answer = manager.explain_metric(&state, metric, 5);
            assert!(
                !answer["current"].is_null(),
                "no current value for '{}'",
                metric
            );
        }
    }

    #[test]
    fn test_why_lookback_configurable() {
        let manager = ExplanationsManager::new(&DirectorConfig {
            why_lookback: 2,
            ..DirectorConfig::default()
        });
        let mut state = make_state();
        for tick in 0..5 {
            manager.record_tick(
                &mut state,
                tick,
                &EnvironmentDelta::default(),
                &BTreeMap::new(),
                &[agent_action("renna", "docks")],
                &[],
            );
        }

        let answer = manager.why_summary(&state, "what happened to Renna?");
        assert_eq!(answer["kind"], "agent");
        assert_eq!(answer["answer"]["recent_events"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_why_no_match_suggests() {
        let manager = manager(10);
        let state = make_state();
        let answer = manager.why_summary(&state, "how is the weather?");
        assert_eq!(answer["matched"], false);
        assert!(answer["suggestion"].as_str().unwrap().contains("district"));
    }
}
