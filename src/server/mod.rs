//! HTTP server module
//!
//! Runs the periodic collection loop and serves the latest published
//! snapshot over HTTP.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::signal;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::collector::{Collector, CycleReport};
use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::publisher::{PublishedMetric, SnapshotPublisher};

/// Metrics published by the most recent cycle
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Published metrics; empty after an abandoned cycle
    pub metrics: Vec<PublishedMetric>,
    /// Report of the cycle that produced `metrics`
    pub report: Option<CycleReport>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Latest snapshot
    pub snapshot: Arc<RwLock<Snapshot>>,
    /// Collector self-metrics
    pub stats: Arc<ExporterMetrics>,
}

impl AppState {
    /// Create state with an empty snapshot
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
            stats: Arc::new(ExporterMetrics::new()),
        }
    }
}

/// Build the router for the given state
pub fn router(state: AppState) -> Router {
    let metrics_path = state.config.server.path.clone();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(&metrics_path, get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run one collection cycle and replace the snapshot
///
/// Returns `true` if the cycle reached the publisher. Failures are logged and
/// never propagated; an abandoned cycle clears the snapshot.
pub async fn run_cycle(collector: &Collector, state: &AppState) -> bool {
    let start = Instant::now();
    let mut publisher = SnapshotPublisher::from_config(&state.config.collector);

    match collector.collect(&mut publisher).await {
        Ok(report) => {
            state.stats.record_success(&report);
            *state.snapshot.write().await = Snapshot {
                metrics: publisher.into_metrics(),
                report: Some(report),
            };
            true
        }
        Err(e) => {
            state.stats.record_failure(start.elapsed());
            if e.is_document_error() {
                error!(error = %e, "Status document rejected");
            } else {
                error!(url = %collector.client().url(), error = %e, "Unable to fetch status");
            }
            *state.snapshot.write().await = Snapshot::default();
            false
        }
    }
}

/// Collect on a fixed interval until the task is aborted
async fn collection_loop(collector: Collector, state: AppState) {
    let period = Duration::from_secs(state.config.collector.interval_secs);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        run_cycle(&collector, &state).await;
    }
}

/// Run the collector daemon
///
/// # Arguments
/// * `config` - Validated application configuration
///
/// # Errors
/// Returns an error if the HTTP client cannot be built or the server fails to start
pub async fn run(config: Config) -> Result<()> {
    let bind_address = config.server.bind_address.clone();
    let port = config.server.port;

    let collector = Collector::new(&config.collector)?;
    let state = AppState::new(config);

    info!(
        url = %collector.client().url(),
        interval_secs = state.config.collector.interval_secs,
        "Starting collection loop"
    );
    let collection = tokio::spawn(collection_loop(collector, state.clone()));

    let metrics_path = state.config.server.path.clone();
    let app = router(state);

    // Handle "localhost" specially, otherwise parse as IP address
    let bind_addr: std::net::IpAddr = if bind_address == "localhost" {
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
    } else {
        bind_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind_address '{}': {}. Use an IP address (e.g., '0.0.0.0', '127.0.0.1') or 'localhost'.", bind_address, e))?
    };
    let addr = SocketAddr::from((bind_addr, port));
    info!(address = %addr, metrics_path = %metrics_path, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    collection.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
