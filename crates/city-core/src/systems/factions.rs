//! Faction subsystem: one weighted action per faction per tick.

use rand::rngs::SmallRng;

use city_events::{EventCategory, SimEvent};

use crate::clamp01;
use crate::rng::weighted_select;
use crate::state::GameState;
use crate::subsystem::{FactionAction, FactionActionKind, Subsystem, SubsystemOutput};

/// Candidate actions in weight-vector order.
const ACTIONS: [FactionActionKind; 5] = [
    FactionActionKind::InvestDistrict,
    FactionActionKind::SuppressUnrest,
    FactionActionKind::Consolidate,
    FactionActionKind::ExpandTerritory,
    FactionActionKind::Stockpile,
];

pub struct FactionSystem;

impl FactionSystem {
    /// Territory district with the highest value of `metric`.
    fn worst_district(
        state: &GameState,
        territory: &[String],
        metric: impl Fn(&crate::components::District) -> f32,
    ) -> Option<String> {
        territory
            .iter()
            .filter_map(|id| state.city.districts.get(id))
            .max_by(|a, b| {
                metric(a)
                    .total_cmp(&metric(b))
                    .then_with(|| b.district_id.cmp(&a.district_id))
            })
            .map(|d| d.district_id.clone())
    }
}

impl Subsystem for FactionSystem {
    fn name(&self) -> &'static str {
        "factions"
    }

    fn tick(&self, state: &mut GameState, rng: &mut SmallRng) -> SubsystemOutput {
        let tick = state.tick;
        let threshold = state.lod.minor_event_threshold();
        let mut output = SubsystemOutput::default();

        let faction_ids: Vec<String> = state.factions.keys().cloned().collect();
        for faction_id in faction_ids {
            let (territory, legitimacy, resources, faction_name) = {
                let faction = &state.factions[&faction_id];
                (
                    faction.territory.clone(),
                    faction.legitimacy,
                    faction.resources,
                    faction.name.clone(),
                )
            };

            let max_unrest = territory
                .iter()
                .filter_map(|id| state.city.districts.get(id))
                .map(|d| d.unrest)
                .fold(0.0_f32, f32::max);
            let max_pollution = territory
                .iter()
                .filter_map(|id| state.city.districts.get(id))
                .map(|d| d.pollution)
                .fold(0.0_f32, f32::max);

            let can_invest = resources >= 1.0;
            let weights = [
                if can_invest { 0.6 * max_pollution + 0.4 } else { 0.0 },
                1.4 * max_unrest,
                1.0 - legitimacy,
                0.3 * legitimacy,
                0.4,
            ];
            let kind = ACTIONS[weighted_select(rng, &weights)];

            let (district, magnitude, severity, headline) = match kind {
                FactionActionKind::InvestDistrict => {
                    let target = Self::worst_district(state, &territory, |d| d.pollution);
                    let magnitude = 0.06;
                    if let Some(id) = &target {
                        if let Some(d) = state.city.districts.get_mut(id) {
                            d.pollution = clamp01(d.pollution - magnitude);
                            d.prosperity = clamp01(d.prosperity + 0.04);
                        }
                        if let Some(f) = state.factions.get_mut(&faction_id) {
                            f.resources = (f.resources - 1.0).max(0.0);
                        }
                    }
                    let headline = match &target {
                        Some(id) => format!("{} funds public works in {}", faction_name, id),
                        None => format!("{} funds public works", faction_name),
                    };
                    (target, magnitude, 0.55, headline)
                }
                FactionActionKind::SuppressUnrest => {
                    let target = Self::worst_district(state, &territory, |d| d.unrest);
                    let magnitude = 0.08;
                    if let Some(id) = &target {
                        if let Some(d) = state.city.districts.get_mut(id) {
                            d.unrest = clamp01(d.unrest - magnitude);
                            d.security = clamp01(d.security + 0.04);
                        }
                    }
                    if let Some(f) = state.factions.get_mut(&faction_id) {
                        // Heavy-handed policing costs public standing.
                        f.legitimacy = clamp01(f.legitimacy - 0.02);
                    }
                    let headline = match &target {
                        Some(id) => format!("{} sends enforcers into {}", faction_name, id),
                        None => format!("{} tightens its patrols", faction_name),
                    };
                    (target, magnitude, 0.6 + 0.3 * max_unrest, headline)
                }
                FactionActionKind::Consolidate => {
                    let magnitude = 0.04;
                    if let Some(f) = state.factions.get_mut(&faction_id) {
                        f.legitimacy = clamp01(f.legitimacy + magnitude);
                    }
                    (None, magnitude, 0.4, format!("{} courts public favor", faction_name))
                }
                FactionActionKind::ExpandTerritory => {
                    // Claim the first unheld district in map order, if any.
                    let target = state
                        .city
                        .districts
                        .keys()
                        .find(|id| !territory.contains(id))
                        .cloned();
                    if let (Some(id), Some(f)) = (&target, state.factions.get_mut(&faction_id)) {
                        f.territory.push(id.clone());
                        f.legitimacy = clamp01(f.legitimacy - 0.01);
                    }
                    let headline = match &target {
                        Some(id) => format!("{} stakes a claim on {}", faction_name, id),
                        None => format!("{} probes for new ground", faction_name),
                    };
                    (target, 0.0, 0.65, headline)
                }
                FactionActionKind::Stockpile => {
                    let magnitude = 0.5 + legitimacy;
                    if let Some(f) = state.factions.get_mut(&faction_id) {
                        f.resources += magnitude;
                    }
                    (None, magnitude, 0.3, format!("{} fills its storehouses", faction_name))
                }
            };

            if severity >= threshold {
                let mut event = SimEvent::new(tick, EventCategory::Faction, self.name(), severity, headline);
                if let Some(id) = &district {
                    event = event.in_district(id);
                }
                output.events.push(event);
            }
            output.faction_actions.push(FactionAction {
                faction_id,
                kind,
                district,
                magnitude,
            });
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
    fn test_every_faction_acts() {
        let mut state = make_state();
        let system = FactionSystem;
        let mut rng = subsystem_rng(3, 0, 2);
        let output = system.tick(&mut state, &mut rng);
        assert_eq!(output.faction_actions.len(), state.factions.len());
    }

    #[test]
    fn test_actions_deterministic() {
        let system = FactionSystem;
        let mut state_a = make_state();
        let mut state_b = make_state();
        let mut rng_a = subsystem_rng(11, 4, 2);
        let mut rng_b = subsystem_rng(11, 4, 2);
        let out_a = system.tick(&mut state_a, &mut rng_a);
        let out_b = system.tick(&mut state_b, &mut rng_b);
        assert_eq!(out_a.faction_actions, out_b.faction_actions);
        assert_eq!(state_a.factions, state_b.factions);
    }

    #[test]
    fn test_high_unrest_draws_suppression() {
        let mut state = make_state();
        for district in state.city.districts.values_mut() {
            district.unrest = 1.0;
        }
        let system = FactionSystem;
        // Across many seeds, suppression should dominate when unrest maxes out.
        let mut suppressions = 0;
        for seed in 0..20 {
            let mut trial = state.clone();
            let mut rng = subsystem_rng(seed, 0, 2);
            let output = system.tick(&mut trial, &mut rng);
            suppressions += output
                .faction_actions
                .iter()
                .filter(|a| a.kind == FactionActionKind::SuppressUnrest)
                .count();
        }
        assert!(suppressions > 10);
    }

    #[test]
    fn test_metrics_bounded_after_tick() {
        let mut state = make_state();
        let system = FactionSystem;
        for tick in 0..50 {
            state.tick = tick;
            let mut rng = subsystem_rng(8, tick, 2);
            system.tick(&mut state, &mut rng);
        }
        assert!(state.metrics_bounded());
    }
}
