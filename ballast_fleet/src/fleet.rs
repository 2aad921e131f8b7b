//! The host fleet rotation core
//!
//! A [`Fleet`] owns the full host population and a rotation cursor. Each
//! generation step selects a batch of hosts proportional to elapsed time,
//! emits one series per measurement field of each selected host, and -- when
//! a full rotation cycle completes -- ages the whole population and churns a
//! fraction of it. Rotation state lives behind a single readers-writer lock:
//! generation steps serialize against each other and against snapshot reads,
//! while snapshot reads may run concurrently with one another.

use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ballast_series::{Label, METRIC_NAME, Sample, TimeSeries};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::host::{Host, TAG_KEYS};
use crate::measurement::Point;
use crate::{Config, Error};

/// The clock a [`Fleet`] consults for sample timestamps.
pub trait Clock {
    /// The current moment.
    fn now(&self) -> SystemTime;
}

/// A clock that reads wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Rotation bookkeeping. The active (not-yet-selected) population is the
/// suffix `all[cursor..]`; a full cycle has completed when the suffix is
/// empty.
#[derive(Debug)]
struct Rotation {
    /// Every host currently alive, in rotation order.
    all: Vec<Host>,
    /// Index of the first host not yet selected this cycle.
    cursor: usize,
    /// Identity for the next churn-created host. Never reused.
    next_ordinal: u64,
}

/// Simulates a rotating fleet of hosts emitting synthetic telemetry.
#[derive(Debug)]
pub struct Fleet<C = WallClock> {
    rotation: RwLock<Rotation>,
    clock: C,
    config: Config,
}

impl Fleet<WallClock> {
    /// Construct a fleet reading wall-clock time for sample timestamps.
    #[must_use]
    pub fn new(config: Config, start: SystemTime) -> Self {
        Self::with_clock(config, start, WallClock)
    }
}

impl<C> Fleet<C>
where
    C: Clock,
{
    /// Construct a fleet with a caller-supplied clock.
    ///
    /// Builds `host_count` hosts with ordinals `0..host_count`, generation 0
    /// and simulated start `start`. No host has been advanced in time yet.
    #[must_use]
    pub fn with_clock(config: Config, start: SystemTime, clock: C) -> Self {
        let count = u64::from(config.host_count.get());
        let all: Vec<Host> = (0..count)
            .map(|ordinal| Host::new(ordinal, 0, start))
            .collect();

        Self {
            rotation: RwLock::new(Rotation {
                all,
                cursor: 0,
                next_ordinal: count,
            }),
            clock,
            config,
        }
    }

    /// The configuration this fleet was constructed with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A defensive copy of the hosts not yet selected in the current
    /// rotation cycle, in rotation order.
    ///
    /// Takes the shared lock: snapshot reads may run concurrently with each
    /// other but not with a generation step.
    ///
    /// # Panics
    ///
    /// Panics if the rotation lock is poisoned.
    #[must_use]
    pub fn hosts(&self) -> Vec<Host> {
        let rotation = self.rotation.read().expect("lock poisoned");
        rotation.all[rotation.cursor..].to_vec()
    }

    /// Run one generation step.
    ///
    /// Selects `ceil(progress_by / scrape_duration * population)` hosts from
    /// the rotation -- at least one, at most the remainder of the current
    /// cycle -- and returns the series emitted for each, keyed by host name.
    /// When the step finds the rotation exhausted it first ages every host
    /// by `progress_by`, churns `ceil(new_series_percent * population)`
    /// hosts from the population tail, and restarts the cycle.
    ///
    /// All samples in one call share a single timestamp, the clock reading
    /// at entry truncated to milliseconds. Host order in the returned map is
    /// not guaranteed; series order within a host follows producer order,
    /// then field order.
    ///
    /// # Errors
    ///
    /// [`Error::NewSeriesPercent`] if `new_series_percent` is outside
    /// `[0.0, 1.0]`; rotation state is untouched in that case.
    ///
    /// # Panics
    ///
    /// Panics if the rotation lock is poisoned.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn generate(
        &self,
        progress_by: Duration,
        scrape_duration: Duration,
        new_series_percent: f64,
    ) -> Result<FxHashMap<String, Vec<TimeSeries>>, Error> {
        let mut rotation = self.rotation.write().expect("lock poisoned");

        if !(0.0..=1.0).contains(&new_series_percent) {
            return Err(Error::NewSeriesPercent(new_series_percent));
        }

        let now = self.clock.now();
        let factor_progress = progress_by.as_secs_f64() / scrape_duration.as_secs_f64();
        let mut num_hosts = (factor_progress * rotation.all.len() as f64).ceil() as usize;
        if num_hosts == 0 {
            // Always progress by at least one
            num_hosts = 1;
        }

        if rotation.cursor == rotation.all.len() {
            // Cycle complete: age the whole population, churn, restart.
            for host in &mut rotation.all {
                host.tick(progress_by);
            }
            if new_series_percent > 0.0 {
                let len = rotation.all.len();
                let remove = (new_series_percent * len as f64).ceil() as usize;
                rotation.all.truncate(len - remove);
                for _ in 0..remove {
                    let ordinal = rotation.next_ordinal;
                    rotation.next_ordinal += 1;
                    rotation.all.push(Host::new(ordinal, 0, now));
                }
                debug!(retired = remove, created = remove, "churned population");
            }
            rotation.cursor = 0;
        }

        let remaining = rotation.all.len() - rotation.cursor;
        if num_hosts > remaining {
            num_hosts = remaining;
        }

        let selected = rotation.cursor;
        rotation.cursor += num_hosts;
        let cursor = rotation.cursor;

        let timestamp = unix_millis(now);
        let mut point = Point::new();
        let mut host_values = FxHashMap::default();
        for host in &rotation.all[selected..cursor] {
            let tags = host.tag_values();
            let mut all_series = Vec::new();
            for measurement in host.measurements() {
                measurement.to_point(&mut point);
                for (field, value) in point.field_keys.iter().zip(&point.field_values) {
                    let mut labels = Vec::with_capacity(2 + TAG_KEYS.len());
                    labels.push(Label::new(METRIC_NAME, point.measurement));
                    labels.push(Label::new("measurement", *field));
                    for (key, tag) in TAG_KEYS.iter().zip(tags) {
                        labels.push(Label::new(*key, tag));
                    }

                    all_series.push(TimeSeries {
                        labels,
                        samples: vec![Sample {
                            value: value.as_f64(),
                            timestamp,
                        }],
                    });
                }
            }
            host_values.insert(host.name().to_string(), all_series);
        }

        Ok(host_values)
    }
}

/// Millisecond truncation of a clock reading; pre-epoch readings clamp to
/// zero.
#[allow(clippy::cast_possible_truncation)]
fn unix_millis(now: SystemTime) -> i64 {
    now.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::num::NonZeroU32;

    const FIXED_EPOCH_SECS: u64 = 1_700_000_000;

    #[derive(Debug, Clone, Copy)]
    struct FixedClock(SystemTime);

    impl Clock for FixedClock {
        fn now(&self) -> SystemTime {
            self.0
        }
    }

    fn config(host_count: u32) -> Config {
        Config {
            host_count: NonZeroU32::new(host_count).expect("nonzero host count"),
            static_labels: FxHashMap::default(),
        }
    }

    fn fleet(host_count: u32) -> Fleet<FixedClock> {
        let start = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        Fleet::with_clock(
            config(host_count),
            start,
            FixedClock(UNIX_EPOCH + Duration::from_secs(FIXED_EPOCH_SECS)),
        )
    }

    fn field_value(series: &[TimeSeries], metric: &str, field: &str) -> f64 {
        series
            .iter()
            .find(|s| s.metric_name() == Some(metric) && s.label_value("measurement") == Some(field))
            .expect("series present")
            .samples[0]
            .value
    }

    #[test]
    fn full_ratio_selects_entire_population() {
        let fleet = fleet(10);
        let out = fleet
            .generate(Duration::from_secs(60), Duration::from_secs(60), 0.0)
            .expect("generate");
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn cycle_selects_each_host_exactly_once() {
        let fleet = fleet(10);
        let initial: HashSet<String> = fleet
            .hosts()
            .iter()
            .map(|h| h.name().to_string())
            .collect();

        // ceil(0.25 * 10) = 3 hosts per call; the fourth call clamps to the
        // single host left in the cycle.
        let mut seen: HashSet<String> = HashSet::new();
        for expected in [3, 3, 3, 1] {
            let out = fleet
                .generate(Duration::from_secs(1), Duration::from_secs(4), 0.0)
                .expect("generate");
            assert_eq!(out.len(), expected);
            for name in out.keys() {
                assert!(seen.insert(name.clone()), "host selected twice: {name}");
            }
        }
        assert_eq!(seen, initial);
    }

    #[test]
    fn snapshot_tracks_rotation_suffix() {
        let fleet = fleet(10);
        assert_eq!(fleet.hosts().len(), 10);

        fleet
            .generate(Duration::from_secs(1), Duration::from_secs(4), 0.0)
            .expect("generate");
        let remaining = fleet.hosts();
        assert_eq!(remaining.len(), 7);
        // The suffix keeps rotation order: host_3 onward.
        assert_eq!(remaining[0].name(), "host_3");
        assert_eq!(remaining[6].name(), "host_9");

        fleet
            .generate(Duration::from_secs(60), Duration::from_secs(60), 0.0)
            .expect("generate");
        assert!(fleet.hosts().is_empty());
    }

    #[test]
    fn churn_replaces_tail_and_preserves_size() {
        let fleet = fleet(10);
        let full = (Duration::from_secs(60), Duration::from_secs(60));

        let first = fleet.generate(full.0, full.1, 0.3).expect("generate");
        assert_eq!(first.len(), 10);

        // Second call finds the rotation exhausted: three hosts churn off
        // the tail, replacements take ordinals 10..13.
        let second = fleet.generate(full.0, full.1, 0.3).expect("generate");
        assert_eq!(second.len(), 10);
        for name in ["host_7", "host_8", "host_9"] {
            assert!(!second.contains_key(name), "{name} should have churned");
        }
        for name in ["host_10", "host_11", "host_12"] {
            assert!(second.contains_key(name), "{name} should have joined");
        }

        // The freshest hosts sit at the tail, so they churn next.
        let third = fleet.generate(full.0, full.1, 0.3).expect("generate");
        assert_eq!(third.len(), 10);
        for name in ["host_10", "host_11", "host_12"] {
            assert!(!third.contains_key(name), "{name} should have churned");
        }
        for name in ["host_13", "host_14", "host_15"] {
            assert!(third.contains_key(name), "{name} should have joined");
        }
    }

    #[test]
    fn full_churn_replaces_everyone() {
        let fleet = fleet(10);
        let full = (Duration::from_secs(60), Duration::from_secs(60));

        fleet.generate(full.0, full.1, 1.0).expect("generate");
        let second = fleet.generate(full.0, full.1, 1.0).expect("generate");

        assert_eq!(second.len(), 10);
        for ordinal in 10..20 {
            assert!(second.contains_key(&format!("host_{ordinal}")));
        }
    }

    #[test]
    fn invalid_churn_fraction_rejected_without_state_change() {
        let invalid = fleet(10);
        let pristine = fleet(10);

        let err = invalid
            .generate(Duration::from_secs(1), Duration::from_secs(4), 1.5)
            .expect_err("churn fraction above 1.0 must be rejected");
        assert_eq!(err, Error::NewSeriesPercent(1.5));
        assert_eq!(
            err.to_string(),
            "new_series_percent not between [0.0,1.0]: value=1.5"
        );

        invalid
            .generate(Duration::from_secs(1), Duration::from_secs(4), -0.1)
            .expect_err("negative churn fraction must be rejected");

        // The failed calls left no trace: both fleets now emit identically.
        let a = invalid
            .generate(Duration::from_secs(1), Duration::from_secs(4), 0.0)
            .expect("generate");
        let b = pristine
            .generate(Duration::from_secs(1), Duration::from_secs(4), 0.0)
            .expect("generate");
        assert_eq!(a, b);
    }

    #[test]
    fn series_shape_and_label_order() {
        let fleet = fleet(1);
        let out = fleet
            .generate(Duration::from_secs(60), Duration::from_secs(60), 0.0)
            .expect("generate");

        let series = &out["host_0"];
        // cpu 6 + mem 5 + disk 6 + net 6 + kernel 4 fields.
        assert_eq!(series.len(), 27);

        let host = Host::new(0, 0, UNIX_EPOCH + Duration::from_secs(1_600_000_000));
        for s in series {
            assert_eq!(s.labels.len(), 12);
            assert_eq!(s.labels[0].name, METRIC_NAME);
            assert_eq!(s.labels[1].name, "measurement");
            for (label, (key, value)) in
                s.labels[2..].iter().zip(TAG_KEYS.iter().zip(host.tag_values()))
            {
                assert_eq!(label.name, *key);
                assert_eq!(label.value, value);
            }

            assert_eq!(s.samples.len(), 1);
            let expected_ms: i64 = (FIXED_EPOCH_SECS * 1_000).try_into().expect("fits");
            assert_eq!(s.samples[0].timestamp, expected_ms);
        }

        // Producer order, then field order.
        let metric_order: Vec<&str> = series.iter().filter_map(TimeSeries::metric_name).collect();
        let mut expected = Vec::new();
        expected.extend(std::iter::repeat_n("cpu", 6));
        expected.extend(std::iter::repeat_n("mem", 5));
        expected.extend(std::iter::repeat_n("disk", 6));
        expected.extend(std::iter::repeat_n("net", 6));
        expected.extend(std::iter::repeat_n("kernel", 4));
        assert_eq!(metric_order, expected);
        assert_eq!(series[0].label_value("measurement"), Some("usage_user"));
    }

    #[test]
    fn idle_hosts_age_at_cycle_reset() {
        let fleet = fleet(2);
        let full = (Duration::from_secs(60), Duration::from_secs(60));

        let first = fleet.generate(full.0, full.1, 0.0).expect("generate");
        let second = fleet.generate(full.0, full.1, 0.0).expect("generate");

        for name in ["host_0", "host_1"] {
            let before = field_value(&first[name], "net", "bytes_sent");
            let after = field_value(&second[name], "net", "bytes_sent");
            assert!(after >= before, "{name} counter regressed");
        }
    }

    #[test]
    fn wall_clock_timestamps_are_post_epoch() {
        let start = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let fleet = Fleet::new(config(3), start);
        let out = fleet
            .generate(Duration::from_secs(60), Duration::from_secs(60), 0.0)
            .expect("generate");
        assert_eq!(out.len(), 3);
        for series in out.values().flatten() {
            assert!(series.samples[0].timestamp > 0);
        }
    }

    #[test]
    fn config_is_retained() {
        let fleet = fleet(4);
        assert_eq!(fleet.config().host_count.get(), 4);
        assert!(fleet.config().static_labels.is_empty());
    }

    proptest! {
        // The rotation always progresses by at least one host, no matter how
        // small the elapsed time.
        #[test]
        fn at_least_one_host_per_step(
            host_count in 1..64_u32,
            progress_ms in 0..10_u64,
            steps in 1..10_usize,
        ) {
            let fleet = fleet(host_count);
            for _ in 0..steps {
                let out = fleet
                    .generate(
                        Duration::from_millis(progress_ms),
                        Duration::from_secs(60),
                        0.0,
                    )
                    .expect("generate");
                prop_assert!(!out.is_empty());
                prop_assert!(out.len() <= host_count as usize);
            }
        }

        // A full cycle with churn keeps the population size constant and
        // only ever mints fresh, strictly larger ordinals.
        #[test]
        fn churn_preserves_population_size(
            host_count in 1..32_u32,
            churn in 0.0..=1.0_f64,
            cycles in 1..5_usize,
        ) {
            let fleet = fleet(host_count);
            let full = (Duration::from_secs(60), Duration::from_secs(60));
            let mut max_seen: u64 = 0;

            for _ in 0..cycles {
                let out = fleet.generate(full.0, full.1, churn).expect("generate");
                prop_assert_eq!(out.len(), host_count as usize);

                let cycle_max = out
                    .keys()
                    .map(|name| {
                        name.strip_prefix("host_")
                            .expect("host name prefix")
                            .parse::<u64>()
                            .expect("ordinal")
                    })
                    .max()
                    .expect("non-empty");
                prop_assert!(cycle_max >= max_seen);
                max_seen = cycle_max;
            }
        }

        // With a fixed clock, generation is a pure function of the inputs.
        #[test]
        fn is_deterministic(
            host_count in 1..32_u32,
            churn in 0.0..=1.0_f64,
            progress_secs in 1..120_u64,
            scrape_secs in 1..120_u64,
            steps in 1..16_usize,
        ) {
            let a = fleet(host_count);
            let b = fleet(host_count);

            for _ in 0..steps {
                let out_a = a
                    .generate(
                        Duration::from_secs(progress_secs),
                        Duration::from_secs(scrape_secs),
                        churn,
                    )
                    .expect("generate");
                let out_b = b
                    .generate(
                        Duration::from_secs(progress_secs),
                        Duration::from_secs(scrape_secs),
                        churn,
                    )
                    .expect("generate");
                prop_assert_eq!(out_a, out_b);
            }
        }
    }
}
