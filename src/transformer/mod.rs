//! Metric extraction module
//!
//! This module walks a decoded VTS status document and maps it onto a flat,
//! dotted namespace of counters and gauges.
//!
//! # Groups
//!
//! - `<host>.conn.*` - connection counters (always present)
//! - `<host>.vhosts.<zone>.*` - per server zone
//! - `<host>.upstreams.<group>.<server>.*` - per upstream member
//!
//! Zone and upstream groups are extracted independently: a malformed entry
//! fails only its own group.

pub mod extract;
pub mod naming;

use std::fmt;

use serde::Serialize;

pub use extract::{
    extract_all, extract_connections, extract_server_zones, extract_upstream_zones, Extraction,
    GroupResult,
};
pub use naming::{sanitize_segment, zone_segment};

/// Metric kind as understood by the publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Cumulative, monotonically non-decreasing value
    Counter,
    /// Point-in-time value
    Gauge,
}

impl MetricKind {
    /// Lowercase name used in output
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted metric
///
/// `name` is a dotted path; every segment derived from a zone, upstream group
/// or server identifier has already been sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricEmission {
    /// Dotted metric path
    pub name: String,
    /// Counter or gauge
    pub kind: MetricKind,
    /// Raw value from the status document
    pub value: u64,
}

impl MetricEmission {
    /// Create a counter emission
    pub fn counter(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Counter,
            value,
        }
    }

    /// Create a gauge emission
    pub fn gauge(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Gauge,
            value,
        }
    }
}

/// Optional metric groups of a status document
///
/// Connections are not a group: they are required and validated at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricGroup {
    /// `serverZones`
    ServerZones,
    /// `upstreamZones`
    UpstreamZones,
}

impl MetricGroup {
    /// Field name in the status document
    pub fn field(&self) -> &'static str {
        match self {
            MetricGroup::ServerZones => "serverZones",
            MetricGroup::UpstreamZones => "upstreamZones",
        }
    }
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_kind_display() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
    }

    #[test]
    fn test_metric_group_display() {
        assert_eq!(MetricGroup::ServerZones.to_string(), "serverZones");
        assert_eq!(MetricGroup::UpstreamZones.to_string(), "upstreamZones");
    }

    #[test]
    fn test_emission_constructors() {
        let c = MetricEmission::counter("h1.conn.active", 3);
        assert_eq!(c.kind, MetricKind::Counter);
        let g = MetricEmission::gauge("h1.vhosts.all.responses.2xx", 4);
        assert_eq!(g.kind, MetricKind::Gauge);
        assert_eq!(g.value, 4);
    }
}
