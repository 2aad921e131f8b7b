//! Canonical representation of an emitted series record
//!
//! This library defines the core data structures for representing a single
//! simulated time series observation: an ordered label set plus timestamped
//! numeric samples. These structures are encoder-agnostic; remote-write
//! framing is the concern of whatever consumes them downstream.

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
#![allow(clippy::multiple_crate_versions)]

use serde::{Deserialize, Serialize};

/// The label key that carries the metric name in a remote-write label set.
pub const METRIC_NAME: &str = "__name__";

/// One key/value pair in a series label set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    /// The label key.
    pub name: String,
    /// The label value.
    pub value: String,
}

impl Label {
    /// Construct a new `Label` from anything string-like.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One observation in a series.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Sample {
    /// The observed value.
    pub value: f64,
    /// Milliseconds since the Unix epoch at which the value was observed.
    /// Finer-grained clock readings are truncated, never rounded.
    pub timestamp: i64,
}

/// An ordered label set plus the samples observed for it.
///
/// The generation step always emits exactly one sample per series; the
/// samples field is a sequence because the remote-write shape downstream
/// allows batching multiple observations under one label set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TimeSeries {
    /// Label set, in emission order. Order is meaningful and preserved.
    pub labels: Vec<Label>,
    /// Samples observed for this label set.
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    /// Look up the value of the label named `name`, if present.
    #[must_use]
    pub fn label_value(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// The value carried in the metric-name label, if present.
    #[must_use]
    pub fn metric_name(&self) -> Option<&str> {
        self.label_value(METRIC_NAME)
    }
}
