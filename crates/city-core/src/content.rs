//! Static world content.
//!
//! A `WorldDef` is the validated output of the external content loader:
//! district layout with adjacency, factions, agents, and story seed
//! definitions. It is consumed once when the game state is built and never
//! mutated afterwards; the adjacency map in particular is copied into
//! `FocusState` at load time and stays static for the whole run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{
    Agent, City, District, Economy, Environment, Faction, LodMode, Progression,
};
use crate::state::{GameState, StateMetadata, StorySeedState};

/// Static definition of a district.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub adjacent: Vec<String>,
    pub unrest: f32,
    pub pollution: f32,
    pub prosperity: f32,
    pub security: f32,
}

/// Static definition of a faction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionDef {
    pub id: String,
    pub name: String,
    pub legitimacy: f32,
    #[serde(default)]
    pub territory: Vec<String>,
    pub resources: f32,
}

/// Static definition of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDef {
    pub id: String,
    pub name: String,
    pub faction: String,
    pub district: String,
    pub role: String,
    pub ambition: f32,
    pub morale: f32,
}

/// Comparison direction for a seed trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Above,
    Below,
}

impl Comparator {
    pub fn compare(self, value: f32, threshold: f32) -> bool {
        match self {
            Comparator::Above => value > threshold,
            Comparator::Below => value < threshold,
        }
    }
}

/// Declarative trigger condition of a story seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Trigger {
    Environment {
        metric: String,
        comparator: Comparator,
        threshold: f32,
    },
    Faction {
        faction_id: String,
        metric: String,
        comparator: Comparator,
        threshold: f32,
    },
    District {
        district_id: String,
        metric: String,
        comparator: Comparator,
        threshold: f32,
    },
}

impl Trigger {
    /// Evaluates the trigger against post-tick state. Unknown metric or
    /// entity ids simply never fire; content validation happens upstream.
    pub fn satisfied(&self, state: &GameState) -> bool {
        match self {
            Trigger::Environment {
                metric,
                comparator,
                threshold,
            } => {
                let value = match metric.as_str() {
                    "stability" => state.environment.stability,
                    "unrest" => state.environment.unrest,
                    "pollution" => state.environment.pollution,
                    "biodiversity" => state.environment.biodiversity,
                    _ => return false,
                };
                comparator.compare(value, *threshold)
            }
            Trigger::Faction {
                faction_id,
                metric,
                comparator,
                threshold,
            } => {
                let Some(faction) = state.factions.get(faction_id) else {
                    return false;
                };
                let value = match metric.as_str() {
                    "legitimacy" => faction.legitimacy,
                    "resources" => faction.resources,
                    _ => return false,
                };
                comparator.compare(value, *threshold)
            }
            Trigger::District {
                district_id,
                metric,
                comparator,
                threshold,
            } => {
                let Some(district) = state.city.districts.get(district_id) else {
                    return false;
                };
                let value = match metric.as_str() {
                    "unrest" => district.unrest,
                    "pollution" => district.pollution,
                    "prosperity" => district.prosperity,
                    "security" => district.security,
                    _ => return false,
                };
                comparator.compare(value, *threshold)
            }
        }
    }
}

/// Authored story seed: trigger, cooldown, and resolution behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedDef {
    pub id: String,
    /// Higher priority activates first when several seeds fire together
    pub priority: u32,
    pub trigger: Trigger,
    pub cooldown_ticks: u64,
    /// 0 means single-shot: the seed resolves in its activation tick
    #[serde(default)]
    pub duration_ticks: u64,
    pub headline: String,
    pub resolution: String,
}

/// The validated static content a run is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldDef {
    pub city_name: String,
    pub districts: Vec<DistrictDef>,
    pub factions: Vec<FactionDef>,
    pub agents: Vec<AgentDef>,
    #[serde(default)]
    pub seeds: Vec<SeedDef>,
    #[serde(default)]
    pub environment: Environment,
    /// Starting stocks per commodity; prices start at 1.0
    #[serde(default)]
    pub initial_stocks: BTreeMap<String, f32>,
}

impl WorldDef {
    /// Builds the initial game state, including the static adjacency map
    /// and one dormant seed state per authored seed.
    pub fn build_state(&self, lod: LodMode) -> GameState {
        let mut city = City {
            name: self.city_name.clone(),
            districts: BTreeMap::new(),
        };
        let mut adjacency = BTreeMap::new();
        for def in &self.districts {
            let mut district = District {
                district_id: def.id.clone(),
                name: def.name.clone(),
                unrest: def.unrest,
                pollution: def.pollution,
                prosperity: def.prosperity,
                security: def.security,
            };
            district.clamp_modifiers();
            city.districts.insert(def.id.clone(), district);
            adjacency.insert(def.id.clone(), def.adjacent.clone());
        }

        let factions = self
            .factions
            .iter()
            .map(|def| {
                let mut faction = Faction {
                    faction_id: def.id.clone(),
                    name: def.name.clone(),
                    legitimacy: def.legitimacy,
                    territory: def.territory.clone(),
                    resources: def.resources,
                };
                faction.clamp_metrics();
                (def.id.clone(), faction)
            })
            .collect();

        let agents = self
            .agents
            .iter()
            .map(|def| {
                let mut agent = Agent {
                    agent_id: def.id.clone(),
                    name: def.name.clone(),
                    faction: def.faction.clone(),
                    district: def.district.clone(),
                    role: def.role.clone(),
                    ambition: def.ambition,
                    morale: def.morale,
                };
                agent.clamp_traits();
                (def.id.clone(), agent)
            })
            .collect();

        let mut economy = Economy::default();
        for (commodity, stock) in &self.initial_stocks {
            economy.stocks.insert(commodity.clone(), stock.max(0.0));
            economy.prices.insert(commodity.clone(), 1.0);
        }

        let mut metadata = StateMetadata::default();
        metadata.focus_state.adjacency = adjacency;
        for seed in &self.seeds {
            metadata
                .story_seeds
                .insert(seed.id.clone(), StorySeedState::default());
        }

        let mut environment = self.environment.clone();
        environment.clamp_metrics();

        GameState {
            tick: 0,
            city,
            factions,
            agents,
            environment,
            economy,
            progression: Progression::default(),
            lod,
            metadata,
        }
    }

    /// Built-in five-district world used by the CLI and tests.
    pub fn default_world() -> Self {
        let district = |id: &str, name: &str, adjacent: &[&str], unrest: f32, pollution: f32, prosperity: f32, security: f32| DistrictDef {
            id: id.to_string(),
            name: name.to_string(),
            adjacent: adjacent.iter().map(|s| s.to_string()).collect(),
            unrest,
            pollution,
            prosperity,
            security,
        };
        let agent = |id: &str, name: &str, faction: &str, district: &str, role: &str, ambition: f32, morale: f32| AgentDef {
            id: id.to_string(),
            name: name.to_string(),
            faction: faction.to_string(),
            district: district.to_string(),
            role: role.to_string(),
            ambition,
            morale,
        };

        Self {
            city_name: "Veldport".to_string(),
            districts: vec![
                district("civic", "Civic Quarter", &["gardens", "market"], 0.15, 0.15, 0.6, 0.7),
                district("docks", "The Docks", &["industrial", "market"], 0.35, 0.45, 0.4, 0.35),
                district("gardens", "Terrace Gardens", &["civic"], 0.1, 0.05, 0.5, 0.6),
                district("industrial", "Ironworks Belt", &["docks", "market"], 0.3, 0.6, 0.45, 0.4),
                district("market", "Grand Market", &["civic", "docks", "industrial"], 0.2, 0.25, 0.65, 0.5),
            ],
            factions: vec![
                FactionDef {
                    id: "civic-league".to_string(),
                    name: "Civic League".to_string(),
                    legitimacy: 0.65,
                    territory: vec!["civic".to_string(), "gardens".to_string()],
                    resources: 6.0,
                },
                FactionDef {
                    id: "guilds".to_string(),
                    name: "Free Guilds".to_string(),
                    legitimacy: 0.55,
                    territory: vec!["market".to_string()],
                    resources: 8.0,
                },
                FactionDef {
                    id: "syndicate".to_string(),
                    name: "Harbor Syndicate".to_string(),
                    legitimacy: 0.4,
                    territory: vec!["docks".to_string(), "industrial".to_string()],
                    resources: 5.0,
                },
            ],
            agents: vec![
                agent("arden", "Arden", "civic-league", "civic", "magistrate", 0.3, 0.7),
                agent("brin", "Brin", "guilds", "market", "broker", 0.5, 0.6),
                agent("ivo", "Ivo", "syndicate", "industrial", "foreman", 0.45, 0.45),
                agent("mara", "Mara", "civic-league", "gardens", "warden", 0.25, 0.75),
                agent("renna", "Renna", "syndicate", "docks", "organizer", 0.7, 0.4),
                agent("tess", "Tess", "guilds", "market", "clerk", 0.35, 0.65),
            ],
            seeds: vec![
                SeedDef {
                    id: "crisis-of-confidence".to_string(),
                    priority: 70,
                    trigger: Trigger::Faction {
                        faction_id: "syndicate".to_string(),
                        metric: "legitimacy".to_string(),
                        comparator: Comparator::Below,
                        threshold: 0.25,
                    },
                    cooldown_ticks: 10,
                    duration_ticks: 0,
                    headline: "Harbor Syndicate faces a crisis of confidence".to_string(),
                    resolution: "The Syndicate closes ranks behind its captains".to_string(),
                },
                SeedDef {
                    id: "dockside-slump".to_string(),
                    priority: 60,
                    trigger: Trigger::District {
                        district_id: "docks".to_string(),
                        metric: "prosperity".to_string(),
                        comparator: Comparator::Below,
                        threshold: 0.25,
                    },
                    cooldown_ticks: 15,
                    duration_ticks: 4,
                    headline: "Trade dries up along the docks".to_string(),
                    resolution: "Relief shipments steady the harbor economy".to_string(),
                },
                SeedDef {
                    id: "green-collapse".to_string(),
                    priority: 90,
                    trigger: Trigger::Environment {
                        metric: "biodiversity".to_string(),
                        comparator: Comparator::Below,
                        threshold: 0.25,
                    },
                    cooldown_ticks: 20,
                    duration_ticks: 0,
                    headline: "The city's green belt begins to die off".to_string(),
                    resolution: "Replanting crews fan out across the terraces".to_string(),
                },
                SeedDef {
                    id: "streets-boil-over".to_string(),
                    priority: 80,
                    trigger: Trigger::Environment {
                        metric: "unrest".to_string(),
                        comparator: Comparator::Above,
                        threshold: 0.6,
                    },
                    cooldown_ticks: 12,
                    duration_ticks: 3,
                    headline: "Crowds spill into the streets across Veldport".to_string(),
                    resolution: "The crowds disperse as tempers cool".to_string(),
                },
            ],
            environment: Environment::default(),
            initial_stocks: [
                ("goods".to_string(), 40.0),
                ("grain".to_string(), 60.0),
                ("materials".to_string(), 30.0),
            ]
            .into_iter()
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_world_builds() {
        let world = WorldDef::default_world();
        let state = world.build_state(LodMode::Standard);

        assert_eq!(state.tick, 0);
        assert_eq!(state.city.districts.len(), 5);
        assert_eq!(state.factions.len(), 3);
        assert_eq!(state.agents.len(), 6);
        assert_eq!(state.metadata.story_seeds.len(), 4);
        assert!(state.metrics_bounded());
    }

    #[test]
    fn test_adjacency_copied_into_focus_state() {
        let world = WorldDef::default_world();
        let state = world.build_state(LodMode::Standard);
        let adjacency = &state.metadata.focus_state.adjacency;
        assert_eq!(adjacency.get("civic").unwrap(), &vec!["gardens".to_string(), "market".to_string()]);
    }

    #[test]
    fn test_environment_trigger() {
        let world = WorldDef::default_world();
        let mut state = world.build_state(LodMode::Standard);
        let trigger = Trigger::Environment {
            metric: "unrest".to_string(),
            comparator: Comparator::Above,
            threshold: 0.6,
        };
        assert!(!trigger.satisfied(&state));
        state.environment.unrest = 0.7;
        assert!(trigger.satisfied(&state));
    }

    #[test]
    fn test_unknown_ids_never_fire() {
        let world = WorldDef::default_world();
        let state = world.build_state(LodMode::Standard);
        let trigger = Trigger::District {
            district_id: "atlantis".to_string(),
            metric: "unrest".to_string(),
            comparator: Comparator::Above,
            threshold: 0.0,
        };
        assert!(!trigger.satisfied(&state));
        let trigger = Trigger::Environment {
            metric: "weather".to_string(),
            comparator: Comparator::Above,
            threshold: 0.0,
        };
        assert!(!trigger.satisfied(&state));
    }
}
