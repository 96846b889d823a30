//! Internal observability metrics for nginx-vts-collector
//!
//! These describe the collector's own operation and are published alongside
//! the status metrics under `<path>.exporter.*`.
//!
//! `exporter` is a reserved first segment. A status host named `exporter`
//! shares the subtree, but its names always continue with `conn`, `vhosts`
//! or `upstreams`, so no full name is ever shared with a self-metric.
//!
//! # Metrics
//!
//! - `exporter.cycles` - Counter of collection cycles started
//! - `exporter.cycle_failures` - Counter of cycles abandoned (fetch, decode or schema error)
//! - `exporter.group_failures` - Counter of metric groups skipped
//! - `exporter.metrics_published` - Gauge of metrics published by the last successful cycle
//! - `exporter.last_cycle_duration_ms` - Gauge of the last cycle's duration
//! - `exporter.last_success_timestamp` - Gauge of the last successful cycle (Unix seconds)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::collector::CycleReport;
use crate::publisher::{unix_now, Publisher};

/// Thread-safe counter using atomic operations
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the counter by a specific amount
    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe gauge using atomic operations
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Set the gauge to a specific value
    pub fn set(&self, v: u64) {
        self.value.store(v, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Set the gauge to the current Unix timestamp
    pub fn set_to_current_time(&self) {
        self.set(unix_now());
    }
}

/// Collector self-metrics
#[derive(Debug, Default)]
pub struct ExporterMetrics {
    pub cycles: Counter,
    pub cycle_failures: Counter,
    pub group_failures: Counter,
    pub metrics_published: Gauge,
    pub last_cycle_duration_ms: Gauge,
    pub last_success_timestamp: Gauge,
}

impl ExporterMetrics {
    /// Create a new, zeroed set of metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cycle that reached the publisher
    pub fn record_success(&self, report: &CycleReport) {
        self.cycles.inc();
        self.group_failures.inc_by(report.failed_groups.len() as u64);
        self.metrics_published.set(report.published as u64);
        self.last_cycle_duration_ms
            .set(report.duration.as_millis() as u64);
        self.last_success_timestamp.set_to_current_time();
    }

    /// Record an abandoned cycle
    pub fn record_failure(&self, duration: Duration) {
        self.cycles.inc();
        self.cycle_failures.inc();
        self.last_cycle_duration_ms.set(duration.as_millis() as u64);
    }

    /// Publish the current values under `exporter.*`
    pub fn publish_to<P: Publisher + ?Sized>(&self, publisher: &mut P) {
        publisher.publish_counter("exporter.cycles", self.cycles.get());
        publisher.publish_counter("exporter.cycle_failures", self.cycle_failures.get());
        publisher.publish_counter("exporter.group_failures", self.group_failures.get());
        publisher.publish_gauge("exporter.metrics_published", self.metrics_published.get());
        publisher.publish_gauge(
            "exporter.last_cycle_duration_ms",
            self.last_cycle_duration_ms.get(),
        );
        publisher.publish_gauge(
            "exporter.last_success_timestamp",
            self.last_success_timestamp.get(),
        );
    }
}
