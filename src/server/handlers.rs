//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument};

use super::AppState;
use crate::collector::CycleReport;
use crate::publisher::{LineFormatter, SnapshotPublisher};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
    /// Report of the last successful cycle, if the snapshot holds one
    last_cycle: Option<CycleReport>,
}

/// Root endpoint - displays basic info
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>nginx-vts-collector</title>
</head>
<body>
    <h1>nginx-vts-collector</h1>
    <p>Version: {}</p>
    <p>Status endpoint: {}</p>
    <ul>
        <li><a href="/health">Health Check</a></li>
        <li><a href="{}">Metrics</a></li>
    </ul>
</body>
</html>"#,
        env!("CARGO_PKG_VERSION"),
        state.config.collector.status_url(),
        state.config.server.path
    );
    Html(html)
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let last_cycle = state.snapshot.read().await.report.clone();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        last_cycle,
    })
}

/// Metrics endpoint - latest snapshot followed by the collector's own metrics
#[instrument(skip(state), name = "metrics_handler")]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let formatter = LineFormatter::new();

    let mut output = {
        let snapshot = state.snapshot.read().await;
        formatter.format(&snapshot.metrics)
    };

    let mut own = SnapshotPublisher::from_config(&state.config.collector);
    state.stats.publish_to(&mut own);
    output.push_str(&formatter.format(own.metrics()));

    debug!(bytes = output.len(), "Serving metrics snapshot");

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        output,
    )
}
