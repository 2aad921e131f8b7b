//! Network interface counters.

use std::time::Duration;

use rand::{Rng, rngs::SmallRng};

use super::{FieldValue, Point};

const FIELDS: [&str; 6] = [
    "bytes_sent",
    "bytes_recv",
    "packets_sent",
    "packets_recv",
    "err_in",
    "err_out",
];

/// Peak per-second accumulation rate for each counter, parallel to `FIELDS`.
const RATES_PER_SEC: [f64; 6] = [10_000_000.0, 10_000_000.0, 10_000.0, 10_000.0, 2.0, 2.0];

/// Simulated network interface. All fields are monotonically increasing
/// counters accumulating at a jittered rate.
#[derive(Debug, Clone)]
pub struct Net {
    rng: SmallRng,
    counters: [i64; 6],
}

impl Net {
    pub(crate) fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            counters: [0; 6],
        }
    }

    pub(crate) fn to_point(&self, point: &mut Point) {
        point.measurement = "net";
        for (key, value) in FIELDS.iter().zip(self.counters) {
            point.push(key, FieldValue::Int(value));
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn tick(&mut self, by: Duration) {
        let span = by.as_secs_f64();
        for (counter, rate) in self.counters.iter_mut().zip(RATES_PER_SEC) {
            *counter += (self.rng.random_range(0.0..=rate) * span) as i64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    proptest! {
        // Counters must never decrease across ticks.
        #[test]
        fn counters_are_monotonic(seed: u64, steps in 1..100_usize, secs in 0..600_u64) {
            let mut net = Net::new(SmallRng::seed_from_u64(seed));
            let mut point = Point::new();
            let mut previous = vec![0.0; FIELDS.len()];

            for _ in 0..steps {
                net.tick(Duration::from_secs(secs));
                net.to_point(&mut point);
                for (value, prev) in point.field_values.iter().zip(previous.iter_mut()) {
                    let value = value.as_f64();
                    prop_assert!(value >= *prev, "counter regressed: {} < {}", value, *prev);
                    *prev = value;
                }
                point.clear();
            }
        }
    }
}
