//! Global environment state.

use serde::{Deserialize, Serialize};

use crate::clamp01;
use city_events::EnvironmentSnapshot;

/// City-wide environment, all metrics bounded to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub stability: f32,
    pub unrest: f32,
    pub pollution: f32,
    pub biodiversity: f32,
}

impl Environment {
    /// Clamps every metric back into [0, 1].
    pub fn clamp_metrics(&mut self) {
        self.stability = clamp01(self.stability);
        self.unrest = clamp01(self.unrest);
        self.pollution = clamp01(self.pollution);
        self.biodiversity = clamp01(self.biodiversity);
    }

    /// True when every metric sits inside [0, 1].
    pub fn metrics_bounded(&self) -> bool {
        [self.stability, self.unrest, self.pollution, self.biodiversity]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }

    /// Point-in-time copy for the explanations timeline.
    pub fn snapshot(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            stability: self.stability,
            unrest: self.unrest,
            pollution: self.pollution,
            biodiversity: self.biodiversity,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            stability: 0.7,
            unrest: 0.2,
            pollution: 0.2,
            biodiversity: 0.8,
        }
    }
}

/// Per-tick change of every environment metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvironmentDelta {
    pub stability: f32,
    pub unrest: f32,
    pub pollution: f32,
    pub biodiversity: f32,
}

impl EnvironmentDelta {
    /// Delta from `before` to `after`.
    pub fn between(before: &Environment, after: &Environment) -> Self {
        Self {
            stability: after.stability - before.stability,
            unrest: after.unrest - before.unrest,
            pollution: after.pollution - before.pollution,
            biodiversity: after.biodiversity - before.biodiversity,
        }
    }

    /// (metric name, delta) pairs in fixed order.
    pub fn named(&self) -> [(&'static str, f32); 4] {
        [
            ("stability", self.stability),
            ("unrest", self.unrest),
            ("pollution", self.pollution),
            ("biodiversity", self.biodiversity),
        ]
    }
}
