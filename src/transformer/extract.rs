//! Extraction Engine - status document to metric emission conversion
//!
//! Each group function returns its emissions as a whole or fails as a whole;
//! `extract_all` decides what survives.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::collector::{Connections, StatusDocument, UpstreamMember, ZoneStats};
use crate::error::GroupError;

use super::naming::{sanitize_segment, zone_segment};
use super::{MetricEmission, MetricGroup};

/// Outcome of extracting a single independent group
pub type GroupResult = Result<Vec<MetricEmission>, GroupError>;

/// Result of one extraction pass over a status document
#[derive(Debug, Default)]
pub struct Extraction {
    /// Emissions in production order
    pub emissions: Vec<MetricEmission>,
    /// Groups that failed and were skipped
    pub failures: Vec<GroupError>,
}

impl Extraction {
    /// Whether every present group was extracted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, result: GroupResult) {
        match result {
            Ok(emissions) => self.emissions.extend(emissions),
            Err(e) => {
                error!(group = %e.group, error = %e.source, "Group extraction failed, skipping");
                self.failures.push(e);
            }
        }
    }
}

/// Extract every metric group from a status document
///
/// Connection metrics come first, in fixed order. Server zones and upstream
/// zones follow when present; their internal order is unspecified.
pub fn extract_all(doc: &StatusDocument) -> Extraction {
    let host = doc.host_name.as_str();
    let mut extraction = Extraction {
        emissions: extract_connections(host, &doc.connections),
        failures: Vec::new(),
    };

    if let Some(zones) = &doc.server_zones {
        extraction.absorb(extract_server_zones(host, zones));
    } else {
        debug!("No serverZones in status document");
    }

    if let Some(upstreams) = &doc.upstream_zones {
        extraction.absorb(extract_upstream_zones(host, upstreams));
    } else {
        debug!("No upstreamZones in status document");
    }

    extraction
}

/// `<host>.conn.<counter>` for the seven connection counters
pub fn extract_connections(host: &str, connections: &Connections) -> Vec<MetricEmission> {
    connections
        .counters()
        .into_iter()
        .map(|(counter, value)| MetricEmission::counter(format!("{host}.conn.{counter}"), value))
        .collect()
}

/// `<host>.vhosts.<zone>.*` for every server zone
pub fn extract_server_zones(host: &str, zones: &Value) -> GroupResult {
    let zones = HashMap::<String, ZoneStats>::deserialize(zones).map_err(|source| GroupError {
        group: MetricGroup::ServerZones,
        source,
    })?;

    let mut emissions = Vec::with_capacity(zones.len() * 8);
    for (key, zone) in &zones {
        let prefix = format!("{host}.vhosts.{}", zone_segment(key));

        emissions.push(MetricEmission::counter(
            format!("{prefix}.requests"),
            zone.request_counter,
        ));
        emissions.push(MetricEmission::counter(
            format!("{prefix}.reqtime"),
            zone.request_msec,
        ));
        emissions.push(MetricEmission::counter(format!("{prefix}.sent"), zone.out_bytes));
        emissions.push(MetricEmission::counter(format!("{prefix}.rcvd"), zone.in_bytes));
        push_responses(&mut emissions, &prefix, &zone.responses);
    }

    Ok(emissions)
}

/// `<host>.upstreams.<group>.<server>.*` for every upstream member
pub fn extract_upstream_zones(host: &str, upstreams: &Value) -> GroupResult {
    let upstreams = HashMap::<String, Vec<UpstreamMember>>::deserialize(upstreams).map_err(
        |source| GroupError {
            group: MetricGroup::UpstreamZones,
            source,
        },
    )?;

    let mut emissions = Vec::new();
    for (group, members) in &upstreams {
        let group = zone_segment(group);

        for member in members {
            let prefix = format!(
                "{host}.upstreams.{group}.{}",
                sanitize_segment(&member.server)
            );

            emissions.push(MetricEmission::counter(
                format!("{prefix}.requests"),
                member.request_counter,
            ));
            emissions.push(MetricEmission::counter(
                format!("{prefix}.reqtime"),
                member.request_msec,
            ));
            emissions.push(MetricEmission::counter(
                format!("{prefix}.resptime"),
                member.response_msec,
            ));
            emissions.push(MetricEmission::counter(
                format!("{prefix}.sent"),
                member.out_bytes,
            ));
            emissions.push(MetricEmission::counter(
                format!("{prefix}.rcvd"),
                member.in_bytes,
            ));
            // Liveness flag, not the balancer weight: 0 when down.
            emissions.push(MetricEmission::counter(
                format!("{prefix}.weight"),
                u64::from(!member.down),
            ));
            push_responses(&mut emissions, &prefix, &member.responses);
        }
    }

    Ok(emissions)
}

/// Response-class labels are embedded as reported.
fn push_responses(
    emissions: &mut Vec<MetricEmission>,
    prefix: &str,
    responses: &HashMap<String, u64>,
) {
    emissions.extend(
        responses
            .iter()
            .map(|(label, count)| MetricEmission::gauge(format!("{prefix}.responses.{label}"), *count)),
    );
}
