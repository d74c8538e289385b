//! Environment upkeep subsystem.
//!
//! Runs first every tick: district-level decay, global metrics pulled
//! toward the city's district means, and threshold-crossing events.

use rand::rngs::SmallRng;
use rand::Rng;

use city_events::{EventCategory, SimEvent};

use crate::clamp01;
use crate::state::GameState;
use crate::subsystem::{Subsystem, SubsystemOutput};

/// How quickly global metrics track district means.
const UNREST_COUPLING: f32 = 0.25;
const POLLUTION_COUPLING: f32 = 0.2;

pub struct EnvironmentSystem;

impl Subsystem for EnvironmentSystem {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn tick(&self, state: &mut GameState, rng: &mut SmallRng) -> SubsystemOutput {
        let tick = state.tick;
        let threshold = state.lod.minor_event_threshold();
        let mut output = SubsystemOutput::default();

        // District upkeep: security pushes unrest down, pollution decays slowly.
        for district in state.city.districts.values_mut() {
            district.unrest = clamp01(district.unrest - 0.02 * district.security + 0.005);
            district.pollution = clamp01(district.pollution - 0.005);
        }

        for district in state.city.districts.values() {
            if district.unrest >= threshold {
                output.events.push(
                    SimEvent::new(
                        tick,
                        EventCategory::Environment,
                        self.name(),
                        district.unrest,
                        format!("unrest simmers in {}", district.name),
                    )
                    .in_district(&district.district_id),
                );
            }
            if district.pollution >= threshold {
                output.events.push(
                    SimEvent::new(
                        tick,
                        EventCategory::Environment,
                        self.name(),
                        district.pollution,
                        format!("smog thickens over {}", district.name),
                    )
                    .in_district(&district.district_id),
                );
            }
        }

        let mean_unrest = state.city.mean_unrest();
        let mean_pollution = state.city.mean_pollution();
        let env = &mut state.environment;

        let jitter = (rng.gen::<f32>() - 0.5) * 0.01;
        env.unrest = clamp01(env.unrest + UNREST_COUPLING * (mean_unrest - env.unrest));
        env.pollution = clamp01(env.pollution + POLLUTION_COUPLING * (mean_pollution - env.pollution));
        env.biodiversity = clamp01(env.biodiversity + 0.008 - 0.04 * env.pollution);
        env.stability = clamp01(env.stability + 0.04 * (1.0 - env.unrest) - 0.09 * env.unrest + jitter);

        if env.stability < 0.3 {
            output.events.push(SimEvent::new(
                tick,
                EventCategory::Environment,
                self.name(),
                1.0 - env.stability,
                "the city's stability is faltering",
            ));
        }
        if env.biodiversity < 0.3 {
            output.events.push(SimEvent::new(
                tick,
                EventCategory::Environment,
                self.name(),
                1.0 - env.biodiversity,
                "green spaces are thinning city-wide",
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LodMode;
    use crate::content::WorldDef;
    use crate::rng::subsystem_rng;

    fn make_state() -> GameState {
        WorldDef::default_world().build_state(LodMode::Standard)
    }

    #[test]
    fn test_metrics_stay_bounded() {
        let mut state = make_state();
        for district in state.city.districts.values_mut() {
            district.unrest = 1.0;
            district.pollution = 1.0;
        }
        let system = EnvironmentSystem;
        for tick in 0..50 {
            state.tick = tick;
            let mut rng = subsystem_rng(42, tick, 0);
            system.tick(&mut state, &mut rng);
            assert!(state.environment.metrics_bounded(), "unbounded at tick {}", tick);
        }
    }

    #[test]
    fn test_high_unrest_emits_events() {
        let mut state = make_state();
        for district in state.city.districts.values_mut() {
            district.unrest = 0.9;
        }
        let system = EnvironmentSystem;
        let mut rng = subsystem_rng(42, 0, 0);
        let output = system.tick(&mut state, &mut rng);
        assert!(output
            .events
            .iter()
            .any(|e| e.headline.contains("unrest simmers")));
    }

    #[test]
    fn test_deterministic_given_same_rng_stream() {
        let system = EnvironmentSystem;
        let mut state_a = make_state();
        let mut state_b = make_state();
        let mut rng_a = subsystem_rng(9, 0, 0);
        let mut rng_b = subsystem_rng(9, 0, 0);
        system.tick(&mut state_a, &mut rng_a);
        system.tick(&mut state_b, &mut rng_b);
        assert_eq!(state_a.environment, state_b.environment);
    }
}
