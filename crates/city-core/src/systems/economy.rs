//! Economy subsystem: production, consumption, price drift.

use rand::rngs::SmallRng;
use rand::Rng;

use city_events::{EventCategory, SimEvent};

use crate::state::GameState;
use crate::subsystem::{Subsystem, SubsystemOutput};

/// Stock level below which a shortage event fires.
const SHORTAGE_FLOOR: f32 = 10.0;

pub struct EconomySystem;

impl Subsystem for EconomySystem {
    fn name(&self) -> &'static str {
        "economy"
    }

    fn tick(&self, state: &mut GameState, rng: &mut SmallRng) -> SubsystemOutput {
        let tick = state.tick;
        let mut output = SubsystemOutput::default();

        let mean_prosperity = state.city.mean_prosperity();
        let district_count = state.city.districts.len() as f32;
        let commodities: Vec<String> = state.economy.stocks.keys().cloned().collect();

        for commodity in &commodities {
            // Prosperous districts produce more; demand scales with the city size.
            let wobble = 0.9 + rng.gen::<f32>() * 0.2;
            let production = mean_prosperity * district_count * 1.2 * wobble;
            let consumption = district_count * 0.8 + state.agents.len() as f32 * 0.1;
            state.economy.adjust_stock(commodity, production - consumption);

            let stock = state.economy.stock(commodity);
            let pressure = (SHORTAGE_FLOOR * 2.0 - stock) / (SHORTAGE_FLOOR * 2.0);
            let factor = 1.0 + 0.05 * pressure.clamp(-1.0, 1.0);
            state.economy.adjust_price(commodity, factor);

            if stock < SHORTAGE_FLOOR {
                let severity = (1.0 - stock / SHORTAGE_FLOOR).clamp(0.0, 1.0);
                output.events.push(SimEvent::new(
                    tick,
                    EventCategory::Economy,
                    self.name(),
                    0.5 + 0.5 * severity,
                    format!("{} runs short across the city", commodity),
                ));
            }
        }

        // Scarcity feeds prosperity pressure in the weakest district.
        let shortages = commodities
            .iter()
            .filter(|c| state.economy.stock(c) < SHORTAGE_FLOOR)
            .count();
        if shortages > 0 {
            if let Some(district) = state
                .city
                .districts
                .values_mut()
                .min_by(|a, b| a.prosperity.total_cmp(&b.prosperity))
            {
                district.prosperity = (district.prosperity - 0.01 * shortages as f32).max(0.0);
            }
        }

        output
    }
}
