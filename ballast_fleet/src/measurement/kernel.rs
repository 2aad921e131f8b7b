//! Kernel activity counters.

use std::time::Duration;

use rand::{Rng, rngs::SmallRng};

use super::{FieldValue, Point};

const INTERRUPTS_PER_SEC: f64 = 50_000.0;
const CONTEXT_SWITCHES_PER_SEC: f64 = 100_000.0;
const FORKS_PER_SEC: f64 = 10.0;

/// Simulated kernel statistics: a fixed boot time plus monotonically
/// increasing activity counters.
#[derive(Debug, Clone)]
pub struct Kernel {
    rng: SmallRng,
    boot_time: i64,
    interrupts: i64,
    context_switches: i64,
    processes_forked: i64,
}

impl Kernel {
    pub(crate) fn new(rng: SmallRng, boot_time: i64) -> Self {
        Self {
            rng,
            boot_time,
            interrupts: 0,
            context_switches: 0,
            processes_forked: 0,
        }
    }

    pub(crate) fn to_point(&self, point: &mut Point) {
        point.measurement = "kernel";
        point.push("boot_time", FieldValue::Int(self.boot_time));
        point.push("interrupts", FieldValue::Int(self.interrupts));
        point.push("context_switches", FieldValue::Int(self.context_switches));
        point.push("processes_forked", FieldValue::Int(self.processes_forked));
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn tick(&mut self, by: Duration) {
        let span = by.as_secs_f64();
        self.interrupts += (self.rng.random_range(0.0..=INTERRUPTS_PER_SEC) * span) as i64;
        self.context_switches +=
            (self.rng.random_range(0.0..=CONTEXT_SWITCHES_PER_SEC) * span) as i64;
        self.processes_forked += (self.rng.random_range(0.0..=FORKS_PER_SEC) * span) as i64;
    }
}
