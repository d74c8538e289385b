//! City and district state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clamp01;

/// One city district with its bounded [0, 1] modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub district_id: String,
    pub name: String,
    pub unrest: f32,
    pub pollution: f32,
    pub prosperity: f32,
    pub security: f32,
}

impl District {
    /// Clamps every modifier back into [0, 1].
    pub fn clamp_modifiers(&mut self) {
        self.unrest = clamp01(self.unrest);
        self.pollution = clamp01(self.pollution);
        self.prosperity = clamp01(self.prosperity);
        self.security = clamp01(self.security);
    }

    /// True when every modifier sits inside [0, 1].
    pub fn modifiers_bounded(&self) -> bool {
        [self.unrest, self.pollution, self.prosperity, self.security]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// The simulated city: districts keyed by id for deterministic iteration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub districts: BTreeMap<String, District>,
}

impl City {
    /// Mean unrest across all districts, 0 when the city is empty.
    pub fn mean_unrest(&self) -> f32 {
        self.mean(|d| d.unrest)
    }

    /// Mean pollution across all districts.
    pub fn mean_pollution(&self) -> f32 {
        self.mean(|d| d.pollution)
    }

    /// Mean prosperity across all districts.
    pub fn mean_prosperity(&self) -> f32 {
        self.mean(|d| d.prosperity)
    }

    /// Mean security across all districts.
    pub fn mean_security(&self) -> f32 {
        self.mean(|d| d.security)
    }

    fn mean(&self, metric: impl Fn(&District) -> f32) -> f32 {
        if self.districts.is_empty() {
            return 0.0;
        }
        let total: f32 = self.districts.values().map(metric).sum();
        total / self.districts.len() as f32
    }
}
