//! Disk capacity and utilization.

use std::time::Duration;

use rand::{Rng, rngs::SmallRng};

use super::{FieldValue, Point};

const GIB: i64 = 1024 * 1024 * 1024;
const TOTAL_CHOICES: [i64; 3] = [256 * GIB, 512 * GIB, 1024 * GIB];
const INODES_PER_GIB: i64 = 65_536;

const USED_PERCENT_MIN: f64 = 1.0;
const USED_PERCENT_MAX: f64 = 99.0;

/// Disks fill and drain slowly relative to memory.
const WALK_PER_SEC: f64 = 0.05;

/// Simulated disk volume. Fixed capacity, slowly walking utilization; inode
/// usage tracks byte usage.
#[derive(Debug, Clone)]
pub struct Disk {
    rng: SmallRng,
    total: i64,
    inodes_total: i64,
    used_percent: f64,
}

impl Disk {
    pub(crate) fn new(mut rng: SmallRng) -> Self {
        let total = TOTAL_CHOICES[rng.random_range(0..TOTAL_CHOICES.len())];
        let used_percent = rng.random_range(USED_PERCENT_MIN..=USED_PERCENT_MAX);
        Self {
            rng,
            total,
            inodes_total: total / GIB * INODES_PER_GIB,
            used_percent,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_point(&self, point: &mut Point) {
        let used = (self.total as f64 * self.used_percent / 100.0) as i64;
        let inodes_used = (self.inodes_total as f64 * self.used_percent / 100.0) as i64;

        point.measurement = "disk";
        point.push("total", FieldValue::Int(self.total));
        point.push("free", FieldValue::Int(self.total - used));
        point.push("used", FieldValue::Int(used));
        point.push("used_percent", FieldValue::Float(self.used_percent));
        point.push("inodes_total", FieldValue::Int(self.inodes_total));
        point.push("inodes_used", FieldValue::Int(inodes_used));
    }

    pub(crate) fn tick(&mut self, by: Duration) {
        let delta = self.rng.random_range(-WALK_PER_SEC..=WALK_PER_SEC) * by.as_secs_f64();
        self.used_percent = (self.used_percent + delta).clamp(USED_PERCENT_MIN, USED_PERCENT_MAX);
    }
}
