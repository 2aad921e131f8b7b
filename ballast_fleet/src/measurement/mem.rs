//! Memory capacity and utilization.

use std::time::Duration;

use rand::{Rng, rngs::SmallRng};

use super::{FieldValue, Point};

const GIB: i64 = 1024 * 1024 * 1024;
const TOTAL_CHOICES: [i64; 4] = [8 * GIB, 16 * GIB, 32 * GIB, 64 * GIB];

/// Utilization walks inside this band; hosts never fully drain or fill.
const USED_PERCENT_MIN: f64 = 5.0;
const USED_PERCENT_MAX: f64 = 95.0;
const WALK_PER_SEC: f64 = 0.5;

/// Simulated memory. Capacity is fixed at construction; utilization walks
/// within a band and the byte fields derive from it.
#[derive(Debug, Clone)]
pub struct Mem {
    rng: SmallRng,
    total: i64,
    used_percent: f64,
}

impl Mem {
    pub(crate) fn new(mut rng: SmallRng) -> Self {
        let total = TOTAL_CHOICES[rng.random_range(0..TOTAL_CHOICES.len())];
        let used_percent = rng.random_range(USED_PERCENT_MIN..=USED_PERCENT_MAX);
        Self {
            rng,
            total,
            used_percent,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_point(&self, point: &mut Point) {
        let used = (self.total as f64 * self.used_percent / 100.0) as i64;
        let available = self.total - used;

        point.measurement = "mem";
        point.push("total", FieldValue::Int(self.total));
        point.push("available", FieldValue::Int(available));
        point.push("used", FieldValue::Int(used));
        point.push("used_percent", FieldValue::Float(self.used_percent));
        point.push(
            "available_percent",
            FieldValue::Float(100.0 - self.used_percent),
        );
    }

    pub(crate) fn tick(&mut self, by: Duration) {
        let delta = self.rng.random_range(-WALK_PER_SEC..=WALK_PER_SEC) * by.as_secs_f64();
        self.used_percent = (self.used_percent + delta).clamp(USED_PERCENT_MIN, USED_PERCENT_MAX);
    }
}
