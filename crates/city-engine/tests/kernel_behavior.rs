//! Behavioral checks over multi-tick runs: attention accounting, bounded
//! histories, story seed activity, and explanation queries.

use city_core::{LodMode, WorldDef};
use city_director::DirectorConfig;
use city_engine::{query_view, EngineConfig, SimEngine, ViewQuery};
use city_events::CausalCategory;

fn make_engine(config: EngineConfig) -> SimEngine {
    let mut engine = SimEngine::new(WorldDef::default_world(), config);
    engine.initialize_state();
    engine
}

#[test]
fn test_unrest_crisis_produces_agent_explanations() {
    // Push every district into crisis, then check the causal timeline
    // actually attributes agent behavior, and nothing escapes its bounds.
    let mut engine = make_engine(EngineConfig::default());
    for district in engine
        .state_mut()
        .unwrap()
        .city
        .districts
        .values_mut()
    {
        district.unrest = 0.9;
    }

    engine.advance_ticks(30, 42).unwrap();

    let timeline = engine.timeline(30);
    let timeline = timeline.unwrap();
    assert!(!timeline.is_empty());
    let agent_events = timeline
        .iter()
        .flat_map(|entry| entry.events.iter())
        .filter(|e| e.category == CausalCategory::Agent)
        .count();
    assert!(agent_events > 0, "no agent causality recorded");

    let state = engine.state().unwrap();
    assert!((0.0..=1.0).contains(&state.environment.stability));
    assert!(state.metrics_bounded());
}

#[test]
fn test_attention_accounting_balances_under_focus() {
    // A calm city at Standard LOD can sit under a small budget for a whole
    // run, so push every district into crisis at Rich LOD: the environment
    // system alone then emits more raw events per tick than the budget.
    let config = EngineConfig {
        lod: LodMode::Rich,
        director: DirectorConfig {
            max_events_per_tick: 2,
            ..DirectorConfig::default()
        },
        ..EngineConfig::default()
    };
    let mut engine = make_engine(config);
    engine.set_focus("industrial").unwrap();
    for district in engine.state_mut().unwrap().city.districts.values_mut() {
        district.unrest = 0.9;
    }

    let reports = engine.advance_ticks(50, 3).unwrap();
    for report in &reports {
        assert!(report.budget_balanced(), "unbalanced at tick {}", report.tick);
        assert!(report.ring_events + report.global_events <= 2);
    }
    // The budget must actually have been exceeded, and every overflow
    // event accounted for in the archive.
    assert!(reports.iter().any(|r| r.raw_events > 2));
    assert!(reports.iter().any(|r| r.archived > 0));
    let total_archived: usize = reports.iter().map(|r| r.archived).sum();
    assert_eq!(
        engine.state().unwrap().metadata.archive.total_archived(),
        total_archived as u64
    );
}

#[test]
fn test_explanation_history_stays_bounded() {
    let config = EngineConfig {
        director: DirectorConfig {
            history_limit: 5,
            ..DirectorConfig::default()
        },
        ..EngineConfig::default()
    };
    let mut engine = make_engine(config);
    engine.advance_ticks(20, 9).unwrap();

    let timeline = engine.timeline(50).unwrap();
    assert_eq!(timeline.len(), 5);
    assert_eq!(timeline.last().unwrap().tick, 19);
    assert_eq!(timeline.first().unwrap().tick, 15);
}

#[test]
fn test_story_seeds_respect_cooldowns_in_full_runs() {
    let mut engine = make_engine(EngineConfig::default());
    // Sustained crisis keeps every trigger satisfied.
    engine.state_mut().unwrap().environment.unrest = 0.95;
    for district in engine.state_mut().unwrap().city.districts.values_mut() {
        district.unrest = 0.95;
    }

    let reports = engine.advance_ticks(60, 5).unwrap();
    let mut activations: Vec<(String, u64)> = Vec::new();
    for report in &reports {
        for seed in &report.seed_activations {
            activations.push((seed.clone(), report.tick));
        }
    }
    assert!(!activations.is_empty(), "no seeds fired under sustained crisis");

    let world = WorldDef::default_world();
    for def in &world.seeds {
        let ticks: Vec<u64> = activations
            .iter()
            .filter(|(id, _)| id == &def.id)
            .map(|(_, tick)| *tick)
            .collect();
        for pair in ticks.windows(2) {
            assert!(
                pair[1] >= pair[0] + def.cooldown_ticks,
                "seed {} re-fired at {} after {}",
                def.id,
                pair[1],
                pair[0]
            );
        }
    }
}

#[test]
fn test_why_queries_route_after_a_run() {
    let mut engine = make_engine(EngineConfig::default());
    engine.advance_ticks(20, 17).unwrap();

    let answer = engine.why("why is unrest rising?").unwrap();
    assert_eq!(answer["matched"], true);
    assert_eq!(answer["kind"], "metric");

    let answer = engine.why("tell me about the Harbor Syndicate").unwrap();
    assert_eq!(answer["kind"], "faction");

    let answer = engine.why("anything about quokkas?").unwrap();
    assert_eq!(answer["matched"], false);
}

#[test]
fn test_views_cover_run_artifacts() {
    let mut engine = make_engine(EngineConfig::default());
    engine.set_focus("docks").unwrap();
    engine.advance_ticks(30, 8).unwrap();

    let focus = query_view(&engine, "focus", &ViewQuery::default()).unwrap();
    assert_eq!(focus["focus"], "docks");

    let archive = query_view(
        &engine,
        "archive",
        &ViewQuery {
            id: None,
            count: Some(5),
        },
    )
    .unwrap();
    assert!(archive.as_array().unwrap().len() <= 5);

    let timeline = query_view(&engine, "timeline", &ViewQuery::default()).unwrap();
    assert_eq!(timeline.as_array().unwrap().len(), 10);
}
