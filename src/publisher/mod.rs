//! Metric publishing
//!
//! The extractor hands every [`MetricEmission`] to a [`Publisher`]. Publishers
//! own everything that happens after naming: timestamping, the namespace
//! prefix and numeric precision.

pub mod formatter;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config::CollectorConfig;
use crate::transformer::{MetricEmission, MetricKind};

pub use formatter::LineFormatter;

/// Sink for extracted metrics
///
/// Names arrive already sanitized; implementations do not validate them.
pub trait Publisher {
    /// Publish a cumulative value as-is
    fn publish_counter(&mut self, name: &str, value: u64);

    /// Publish a point-in-time value
    fn publish_gauge(&mut self, name: &str, value: u64);

    /// Dispatch an emission by kind
    fn publish(&mut self, emission: &MetricEmission) {
        match emission.kind {
            MetricKind::Counter => self.publish_counter(&emission.name, emission.value),
            MetricKind::Gauge => self.publish_gauge(&emission.name, emission.value),
        }
    }
}

/// Collects raw emissions, unprefixed and untimestamped.
impl Publisher for Vec<MetricEmission> {
    fn publish_counter(&mut self, name: &str, value: u64) {
        self.push(MetricEmission::counter(name, value));
    }

    fn publish_gauge(&mut self, name: &str, value: u64) {
        self.push(MetricEmission::gauge(name, value));
    }
}

/// A metric as handed to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedMetric {
    /// Full path including the namespace prefix
    pub path: String,
    /// Counter or gauge
    pub kind: MetricKind,
    /// Value rendered with the configured precision
    pub value: String,
    /// Unix timestamp (seconds)
    pub timestamp: u64,
}

/// Publisher that stamps one collection cycle into a list of [`PublishedMetric`]
///
/// All metrics of a cycle share the timestamp taken at construction.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    prefix: String,
    precision: u8,
    timestamp: u64,
    metrics: Vec<PublishedMetric>,
}

impl SnapshotPublisher {
    /// Create a publisher stamped with the current time
    pub fn new(prefix: impl Into<String>, precision: u8) -> Self {
        Self {
            prefix: prefix.into(),
            precision,
            timestamp: unix_now(),
            metrics: Vec::new(),
        }
    }

    /// Create a publisher using the collector's `path` and `precision`
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(config.path.clone(), config.precision)
    }

    /// Override the cycle timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Metrics published so far
    pub fn metrics(&self) -> &[PublishedMetric] {
        &self.metrics
    }

    /// Consume the publisher and return its metrics
    pub fn into_metrics(self) -> Vec<PublishedMetric> {
        self.metrics
    }

    fn push(&mut self, name: &str, kind: MetricKind, value: u64) {
        let path = if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        };

        self.metrics.push(PublishedMetric {
            path,
            kind,
            value: format_value(value, self.precision),
            timestamp: self.timestamp,
        });
    }
}

impl Publisher for SnapshotPublisher {
    fn publish_counter(&mut self, name: &str, value: u64) {
        self.push(name, MetricKind::Counter, value);
    }

    fn publish_gauge(&mut self, name: &str, value: u64) {
        self.push(name, MetricKind::Gauge, value);
    }
}

/// Render an integer value with `precision` decimal places
///
/// Integers are exact, so the fractional part is always zero; going through
/// `f64` would lose digits above 2^53.
pub fn format_value(value: u64, precision: u8) -> String {
    if precision == 0 {
        value.to_string()
    } else {
        format!("{}.{}", value, "0".repeat(precision as usize))
    }
}

/// Current Unix time in seconds, 0 if the clock is before the epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
