//! CPU utilization gauges.

use std::time::Duration;

use rand::{Rng, rngs::SmallRng};

use super::{FieldValue, Point};

const FIELDS: [&str; 6] = [
    "usage_user",
    "usage_system",
    "usage_idle",
    "usage_iowait",
    "usage_nice",
    "usage_guest",
];

/// Largest per-second movement of a single gauge, in percentage points.
const WALK_PER_SEC: f64 = 1.0;

/// Simulated CPU utilization. Each gauge performs an independent bounded
/// random walk in `[0, 100]`.
#[derive(Debug, Clone)]
pub struct Cpu {
    rng: SmallRng,
    usage: [f64; 6],
}

impl Cpu {
    pub(crate) fn new(mut rng: SmallRng) -> Self {
        let mut usage = [0.0; 6];
        for gauge in &mut usage {
            *gauge = rng.random_range(0.0..=100.0);
        }
        Self { rng, usage }
    }

    pub(crate) fn to_point(&self, point: &mut Point) {
        point.measurement = "cpu";
        for (key, value) in FIELDS.iter().zip(self.usage) {
            point.push(key, FieldValue::Float(value));
        }
    }

    pub(crate) fn tick(&mut self, by: Duration) {
        let span = by.as_secs_f64();
        for gauge in &mut self.usage {
            let delta = self.rng.random_range(-WALK_PER_SEC..=WALK_PER_SEC) * span;
            *gauge = (*gauge + delta).clamp(0.0, 100.0);
        }
    }
}
