//! Synthetic host-fleet telemetry generation
//!
//! This library simulates a rotating fleet of virtual hosts, each emitting
//! synthetic devops measurements, and flattens the result into label/value
//! series suitable for a remote-write encoder. The intended use is
//! benchmarking time-series ingestion pipelines: the [`fleet::Fleet`] owns
//! the host population and on each generation step selects a slice of it
//! proportional to elapsed time, churning a configurable fraction of the
//! population every full rotation cycle.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

use std::num::NonZeroU32;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub mod fleet;
pub mod host;
pub mod measurement;

pub use fleet::{Clock, Fleet, WallClock};
pub use host::Host;
pub use measurement::{FieldValue, Measurement, Point};

/// Errors produced by [`Fleet`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The requested churn fraction is outside the unit interval. The step
    /// aborts before any rotation state is touched.
    #[error("new_series_percent not between [0.0,1.0]: value={0}")]
    NewSeriesPercent(f64),
}

/// Configuration of the host fleet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of hosts in the initial population.
    pub host_count: NonZeroU32,
    /// Labels applied verbatim to every emitted series. Reserved for the
    /// encoder layer; the generation step does not consume these.
    #[serde(default)]
    pub static_labels: FxHashMap<String, String>,
}
