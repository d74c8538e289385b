//! Progression subsystem: score accumulation and milestones.

use rand::rngs::SmallRng;

use city_events::{EventCategory, SimEvent};

use crate::state::GameState;
use crate::subsystem::{Subsystem, SubsystemOutput};

/// Mean prosperity required to extend the streak.
const PROSPERITY_BAR: f32 = 0.55;
/// Consecutive ticks above the bar for the streak milestone.
const STREAK_TICKS: u64 = 10;

pub struct ProgressionSystem;

impl Subsystem for ProgressionSystem {
    fn name(&self) -> &'static str {
        "progression"
    }

    fn tick(&self, state: &mut GameState, _rng: &mut SmallRng) -> SubsystemOutput {
        let tick = state.tick;
        let mut output = SubsystemOutput::default();

        let mean_prosperity = state.city.mean_prosperity();
        let stability = state.environment.stability;
        let progression = &mut state.progression;

        progression.score += mean_prosperity * 0.1 + stability * 0.05;

        if mean_prosperity > PROSPERITY_BAR {
            progression.prosperity_streak += 1;
        } else {
            progression.prosperity_streak = 0;
        }

        if progression.prosperity_streak >= STREAK_TICKS
            && progression.record(
                "prosperous-stretch",
                tick,
                "the city prospered for ten straight ticks",
            )
        {
            tracing::info!(tick, milestone = "prosperous-stretch", "milestone reached");
            output.events.push(SimEvent::new(
                tick,
                EventCategory::Progression,
                self.name(),
                0.7,
                "a stretch of prosperity lifts the whole city",
            ));
        }

        if stability > 0.85
            && progression.record("steady-hand", tick, "stability held above 0.85")
        {
            tracing::info!(tick, milestone = "steady-hand", "milestone reached");
            output.events.push(SimEvent::new(
                tick,
                EventCategory::Progression,
                self.name(),
                0.6,
                "the city feels steadier than it has in years",
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
    fn test_score_accumulates() {
        let mut state = make_state();
        let system = ProgressionSystem;
        let mut rng = subsystem_rng(0, 0, 4);
        system.tick(&mut state, &mut rng);
        assert!(state.progression.score > 0.0);
    }

    #[test]
    fn test_streak_milestone_fires_once() {
        let mut state = make_state();
        for district in state.city.districts.values_mut() {
            district.prosperity = 0.9;
        }
        let system = ProgressionSystem;
        let mut milestone_events = 0;
        for tick in 0..30 {
            state.tick = tick;
            let mut rng = subsystem_rng(0, tick, 4);
            let output = system.tick(&mut state, &mut rng);
            milestone_events += output
                .events
                .iter()
                .filter(|e| e.headline.contains("stretch of prosperity"))
                .count();
        }
        assert_eq!(milestone_events, 1);
        assert!(state.progression.reached("prosperous-stretch"));
    }

    #[test]
    fn test_streak_resets_below_bar() {
        let mut state = make_state();
        for district in state.city.districts.values_mut() {
            district.prosperity = 0.9;
        }
        let system = ProgressionSystem;
        let mut rng = subsystem_rng(0, 0, 4);
        system.tick(&mut state, &mut rng);
        assert_eq!(state.progression.prosperity_streak, 1);

        for district in state.city.districts.values_mut() {
            district.prosperity = 0.1;
        }
        system.tick(&mut state, &mut rng);
        assert_eq!(state.progression.prosperity_streak, 0);
    }
}
