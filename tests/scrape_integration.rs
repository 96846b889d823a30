//! Scrape integration tests
//!
//! End-to-end tests for the collection pipeline and the HTTP surface:
//! - Collection cycle into the shared snapshot
//! - Metrics, health and root endpoints
//! - Abandoned cycles

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use nginx_vts_collector::collector::{Collector, StatusClient};
use nginx_vts_collector::config::Config;
use nginx_vts_collector::server::{router, run_cycle, AppState};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a mock VTS status page
async fn create_mock_vts_server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status/format/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hostName": "web-01",
            "connections": {
                "active": 3, "reading": 0, "writing": 1, "waiting": 2,
                "handled": 40, "accepted": 40, "requests": 120
            },
            "serverZones": {
                "example.com": {
                    "requestCounter": 90, "requestMsec": 12, "outBytes": 9000, "inBytes": 900,
                    "responses": {"2xx": 88, "4xx": 2}
                }
            }
        })))
        .mount(&mock_server)
        .await;

    mock_server
}

fn collector_for(mock_server: &MockServer) -> Collector {
    let url = format!("{}/status/format/json", mock_server.uri());
    Collector::with_client(StatusClient::new(&url, 5000, None).expect("Failed to create client"))
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Test the complete pipeline:
/// 1. Fetch from the mock status page
/// 2. Extract and publish into the snapshot
/// 3. Serve the snapshot on the metrics path
#[tokio::test]
async fn test_basic_scrape() {
    let mock_server = create_mock_vts_server().await;
    let state = AppState::new(Config::default());

    assert!(run_cycle(&collector_for(&mock_server), &state).await);

    let (status, body) = get(state.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    assert!(body.contains("# TYPE nginxvts.web-01.conn.active counter\n"));
    assert!(body.contains("nginxvts.web-01.conn.requests 120 "));
    assert!(body.contains("nginxvts.web-01.vhosts.example_com.sent 9000 "));
    assert!(body.contains("# TYPE nginxvts.web-01.vhosts.example_com.responses.4xx gauge\n"));
    assert!(body.contains("nginxvts.exporter.cycles 1 "));
    assert!(body.contains("nginxvts.exporter.metrics_published 13 "));
}

#[tokio::test]
async fn test_scrape_with_precision() {
    let mock_server = create_mock_vts_server().await;
    let mut config = Config::default();
    config.collector.precision = 2;
    config.collector.path = String::new();
    let state = AppState::new(config);

    assert!(run_cycle(&collector_for(&mock_server), &state).await);

    let (_, body) = get(state, "/metrics").await;
    assert!(body.contains("\nweb-01.conn.active 3.00 "));
}

#[tokio::test]
async fn test_failed_cycle_clears_snapshot() {
    let mock_server = create_mock_vts_server().await;
    let state = AppState::new(Config::default());
    assert!(run_cycle(&collector_for(&mock_server), &state).await);

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;
    assert!(!run_cycle(&collector_for(&broken), &state).await);

    let (status, body) = get(state.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains(".conn."));
    assert!(body.contains("nginxvts.exporter.cycle_failures 1 "));
    assert!(body.contains("nginxvts.exporter.cycles 2 "));
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock_server = create_mock_vts_server().await;
    let state = AppState::new(Config::default());

    let (status, body) = get(state.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["last_cycle"].is_null());

    run_cycle(&collector_for(&mock_server), &state).await;

    let (_, body) = get(state, "/health").await;
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["last_cycle"]["host_name"], "web-01");
    assert_eq!(health["last_cycle"]["published"], 13);
}

#[tokio::test]
async fn test_custom_metrics_path_and_root() {
    let mut config = Config::default();
    config.server.path = "/vts".to_string();
    let state = AppState::new(config);

    let (status, _) = get(state.clone(), "/vts").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(state.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("href=\"/vts\""));
}
