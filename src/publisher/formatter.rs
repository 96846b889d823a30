//! Plain line output
//!
//! This module renders published metrics as one line per metric:
//!
//! ```text
//! # TYPE <path> <counter|gauge>
//! <path> <value> [<timestamp>]
//! ```

use std::fmt::Write;

use super::PublishedMetric;

/// Line formatter for published metrics
///
/// # Example
///
/// ```ignore
/// use nginx_vts_collector::publisher::{LineFormatter, SnapshotPublisher, Publisher};
///
/// let mut publisher = SnapshotPublisher::new("nginxvts", 0);
/// publisher.publish_counter("h1.conn.active", 1);
///
/// let output = LineFormatter::new().format(publisher.metrics());
/// ```
#[derive(Debug, Clone)]
pub struct LineFormatter {
    /// Include timestamp in output
    include_timestamp: bool,
    /// Emit a `# TYPE` line before each metric
    include_type: bool,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self {
            include_timestamp: true,
            include_type: true,
        }
    }
}

impl LineFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include timestamps in output
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    /// Set whether to emit `# TYPE` lines
    pub fn with_types(mut self, include: bool) -> Self {
        self.include_type = include;
        self
    }

    /// Format metrics, preserving their order
    pub fn format(&self, metrics: &[PublishedMetric]) -> String {
        let mut output = String::with_capacity(metrics.len() * 80);

        for metric in metrics {
            self.write_metric(&mut output, metric);
        }

        output
    }

    fn write_metric(&self, output: &mut String, metric: &PublishedMetric) {
        // Writing to a String cannot fail.
        if self.include_type {
            let _ = writeln!(output, "# TYPE {} {}", metric.path, metric.kind);
        }

        if self.include_timestamp {
            let _ = writeln!(output, "{} {} {}", metric.path, metric.value, metric.timestamp);
        } else {
            let _ = writeln!(output, "{} {}", metric.path, metric.value);
        }
    }
}
