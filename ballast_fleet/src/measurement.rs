//! Simulated devops measurements
//!
//! Each simulated host carries a fixed family of measurement producers. A
//! producer holds its own evolving state -- bounded random walks for gauges,
//! monotonic accumulation for counters -- and materializes its current
//! reading into a reusable [`Point`] buffer on demand. State only moves when
//! the producer's simulated clock is advanced via `tick`.

use std::time::Duration;

pub mod cpu;
pub mod disk;
pub mod kernel;
pub mod mem;
pub mod net;

pub use cpu::Cpu;
pub use disk::Disk;
pub use kernel::Kernel;
pub use mem::Mem;
pub use net::Net;

/// A single field reading produced by a measurement.
///
/// This closed set of numeric kinds is the producer contract: every field a
/// producer emits is one of these, and emission coerces both to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// A signed integer, 64 bits wide.
    Int(i64),
    /// A floating point, 64 bits wide.
    Float(f64),
}

impl FieldValue {
    /// Get an f64 representation of this value. Extremely large integers
    /// lose precision.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Int(int) => int as f64,
            FieldValue::Float(float) => float,
        }
    }
}

/// Reusable buffer a measurement materializes its current reading into.
///
/// `field_keys` and `field_values` are parallel: the value of
/// `field_keys[i]` is `field_values[i]`.
#[derive(Debug, Clone, Default)]
pub struct Point {
    /// The measurement name, doubling as the metric name at emission.
    pub measurement: &'static str,
    /// Field names, in the producer's fixed order.
    pub field_keys: Vec<&'static str>,
    /// Field readings, parallel to `field_keys`.
    pub field_values: Vec<FieldValue>,
}

impl Point {
    /// Construct an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the buffer for reuse, retaining its allocations.
    pub fn clear(&mut self) {
        self.measurement = "";
        self.field_keys.clear();
        self.field_values.clear();
    }

    /// Append one field reading.
    pub fn push(&mut self, key: &'static str, value: FieldValue) {
        self.field_keys.push(key);
        self.field_values.push(value);
    }
}

/// One measurement producer attached to a host.
#[derive(Debug, Clone)]
pub enum Measurement {
    /// CPU utilization gauges.
    Cpu(Cpu),
    /// Memory capacity and utilization.
    Mem(Mem),
    /// Disk capacity and utilization.
    Disk(Disk),
    /// Network interface counters.
    Net(Net),
    /// Kernel activity counters.
    Kernel(Kernel),
}

impl Measurement {
    /// Materialize the current reading into `point`. The buffer is cleared
    /// first; previous contents do not leak between producers.
    pub fn to_point(&self, point: &mut Point) {
        point.clear();
        match self {
            Measurement::Cpu(inner) => inner.to_point(point),
            Measurement::Mem(inner) => inner.to_point(point),
            Measurement::Disk(inner) => inner.to_point(point),
            Measurement::Net(inner) => inner.to_point(point),
            Measurement::Kernel(inner) => inner.to_point(point),
        }
    }

    /// Advance the producer's simulated clock by `by`, evolving its state.
    pub fn tick(&mut self, by: Duration) {
        match self {
            Measurement::Cpu(inner) => inner.tick(by),
            Measurement::Mem(inner) => inner.tick(by),
            Measurement::Disk(inner) => inner.tick(by),
            Measurement::Net(inner) => inner.tick(by),
            Measurement::Kernel(inner) => inner.tick(by),
        }
    }
}
