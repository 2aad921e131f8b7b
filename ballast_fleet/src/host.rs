//! Simulated hosts
//!
//! A [`Host`] is one virtual machine in the fleet: a stable identity, a set
//! of descriptive attributes drawn from fixed catalogs at construction, and
//! an ordered collection of measurement producers. Attribute draws and
//! measurement evolution are seeded from the host's identity, so a host
//! constructed twice from the same inputs behaves identically.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::measurement::{Cpu, Disk, Kernel, Measurement, Mem, Net};

/// Label keys for host attributes, in emission order. `tag_values` returns
/// values parallel to this array.
pub const TAG_KEYS: [&str; 10] = [
    "hostname",
    "region",
    "datacenter",
    "rack",
    "os",
    "arch",
    "team",
    "service",
    "service_version",
    "service_environment",
];

struct RegionSpec {
    name: &'static str,
    datacenters: &'static [&'static str],
}

const REGIONS: [RegionSpec; 6] = [
    RegionSpec {
        name: "us-east-1",
        datacenters: &["us-east-1a", "us-east-1b", "us-east-1c"],
    },
    RegionSpec {
        name: "us-west-1",
        datacenters: &["us-west-1a", "us-west-1b"],
    },
    RegionSpec {
        name: "us-west-2",
        datacenters: &["us-west-2a", "us-west-2b", "us-west-2c"],
    },
    RegionSpec {
        name: "eu-west-1",
        datacenters: &["eu-west-1a", "eu-west-1b", "eu-west-1c"],
    },
    RegionSpec {
        name: "eu-central-1",
        datacenters: &["eu-central-1a", "eu-central-1b"],
    },
    RegionSpec {
        name: "ap-southeast-1",
        datacenters: &["ap-southeast-1a", "ap-southeast-1b"],
    },
];

const OS_CHOICES: [&str; 3] = ["Ubuntu16.10", "Ubuntu16.04LTS", "Ubuntu15.10"];
const ARCH_CHOICES: [&str; 2] = ["x64", "x86"];
const TEAM_CHOICES: [&str; 4] = ["SF", "NYC", "LON", "CHI"];
const SERVICE_COUNT: u32 = 20;
const SERVICE_VERSION_CHOICES: [&str; 2] = ["0", "1"];
const SERVICE_ENVIRONMENT_CHOICES: [&str; 3] = ["production", "staging", "test"];
const RACK_COUNT: u32 = 100;

/// One simulated host.
#[derive(Debug, Clone)]
pub struct Host {
    ordinal: u64,
    generation: u64,
    name: String,
    region: &'static str,
    datacenter: &'static str,
    rack: String,
    os: &'static str,
    arch: &'static str,
    team: &'static str,
    service: String,
    service_version: &'static str,
    service_environment: &'static str,
    measurements: Vec<Measurement>,
}

impl Host {
    /// Construct a host from its identity and simulated start time.
    ///
    /// `ordinal` is the stable identity the host name derives from;
    /// `generation` distinguishes re-rolls of the same ordinal. The start
    /// time anchors time-based fields such as the kernel boot time.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(ordinal: u64, generation: u64, start: SystemTime) -> Self {
        let mut rng = SmallRng::seed_from_u64(ordinal ^ generation.rotate_left(32));

        let region = &REGIONS[rng.random_range(0..REGIONS.len())];
        let datacenter = region.datacenters[rng.random_range(0..region.datacenters.len())];

        // Pre-epoch start times clamp to a zero boot time.
        let boot_time = start
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs() as i64);

        let measurements = vec![
            Measurement::Cpu(Cpu::new(SmallRng::from_rng(&mut rng))),
            Measurement::Mem(Mem::new(SmallRng::from_rng(&mut rng))),
            Measurement::Disk(Disk::new(SmallRng::from_rng(&mut rng))),
            Measurement::Net(Net::new(SmallRng::from_rng(&mut rng))),
            Measurement::Kernel(Kernel::new(SmallRng::from_rng(&mut rng), boot_time)),
        ];

        Self {
            ordinal,
            generation,
            name: format!("host_{ordinal}"),
            region: region.name,
            datacenter,
            rack: rng.random_range(0..RACK_COUNT).to_string(),
            os: OS_CHOICES[rng.random_range(0..OS_CHOICES.len())],
            arch: ARCH_CHOICES[rng.random_range(0..ARCH_CHOICES.len())],
            team: TEAM_CHOICES[rng.random_range(0..TEAM_CHOICES.len())],
            service: format!("service_{}", rng.random_range(0..SERVICE_COUNT)),
            service_version: SERVICE_VERSION_CHOICES
                [rng.random_range(0..SERVICE_VERSION_CHOICES.len())],
            service_environment: SERVICE_ENVIRONMENT_CHOICES
                [rng.random_range(0..SERVICE_ENVIRONMENT_CHOICES.len())],
            measurements,
        }
    }

    /// The host's name, derived from its ordinal.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stable ordinal this host was created with.
    #[must_use]
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// The generation marker this host was created with.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The host's measurement producers, in emission order.
    #[must_use]
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Attribute values parallel to [`TAG_KEYS`].
    #[must_use]
    pub fn tag_values(&self) -> [&str; 10] {
        [
            &self.name,
            self.region,
            self.datacenter,
            &self.rack,
            self.os,
            self.arch,
            self.team,
            &self.service,
            self.service_version,
            self.service_environment,
        ]
    }

    /// Advance every measurement's simulated clock by `by`.
    pub fn tick(&mut self, by: Duration) {
        for measurement in &mut self.measurements {
            measurement.tick(by);
        }
    }
}
