//! Economy stocks and prices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Price bounds, in multiples of the base price of 1.0.
pub const PRICE_FLOOR: f32 = 0.1;
pub const PRICE_CEILING: f32 = 10.0;

/// City-wide commodity stocks and prices, keyed by commodity name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Economy {
    pub stocks: BTreeMap<String, f32>,
    pub prices: BTreeMap<String, f32>,
}

impl Economy {
    /// Adds to a commodity stock, flooring at zero.
    pub fn adjust_stock(&mut self, commodity: &str, amount: f32) {
        let stock = self.stocks.entry(commodity.to_string()).or_insert(0.0);
        *stock = (*stock + amount).max(0.0);
    }

    /// Multiplies a commodity price, clamped to [PRICE_FLOOR, PRICE_CEILING].
    pub fn adjust_price(&mut self, commodity: &str, factor: f32) {
        let price = self.prices.entry(commodity.to_string()).or_insert(1.0);
        *price = (*price * factor).clamp(PRICE_FLOOR, PRICE_CEILING);
    }

    pub fn stock(&self, commodity: &str) -> f32 {
        self.stocks.get(commodity).copied().unwrap_or(0.0)
    }

    pub fn price(&self, commodity: &str) -> f32 {
        self.prices.get(commodity).copied().unwrap_or(1.0)
    }
}
