//! CLI integration tests
//!
//! Tests for the command-line interface using assert_cmd.
//!
//! These tests verify:
//! - Help and version flags
//! - Configuration validation
//! - Single-cycle mode against a mock status page

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for the nginx-vts-collector binary
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("nginx-vts-collector")
        .expect("Failed to find nginx-vts-collector binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Helper to create a temporary config file with given content
fn create_temp_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file.flush().expect("Failed to flush");
    file
}

/// Test --help flag displays usage information
#[test]
fn test_help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--req-host"))
        .stdout(predicate::str::contains("--once"));
}

/// Test --version flag displays version
#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that a valid configuration is accepted via --validate flag
#[test]
fn test_validate_valid_config() {
    let config = r#"
collector:
  req_host: "10.1.2.3"
  req_port: "8080"
  req_ssl: "false"
  precision: 1

server:
  port: 19913
  path: "/metrics"
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains(
            "http://10.1.2.3:8080/status/format/json",
        ));
}

/// Test --validate with JSON output reflects CLI overrides
#[test]
fn test_validate_json_with_overrides() {
    let file = create_temp_config("collector:\n  req_host: \"10.1.2.3\"\n");

    cmd()
        .arg("-c")
        .arg(file.path())
        .args(["--req-ssl", "true", "--req-port", "8443"])
        .args(["--validate", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"req_ssl\": true"))
        .stdout(predicate::str::contains("\"req_port\": 8443"));
}

/// Test that VTS_REQ_SSL accepts the same spellings as the config file
#[test]
fn test_validate_env_ssl_spelling() {
    let file = create_temp_config("collector:\n  req_ssl: false\n");

    cmd()
        .arg("-c")
        .arg(file.path())
        .env("VTS_REQ_SSL", "yes")
        .args(["--validate", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"req_ssl\": true"));
}

/// Test that unparseable loose values are rejected
#[test]
fn test_validate_rejects_bad_boolean() {
    let file = create_temp_config("collector:\n  req_ssl: \"maybe\"\n");

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("maybe"));
}

/// Test that invalid YAML is rejected
#[test]
fn test_validate_invalid_config_bad_yaml() {
    let file = create_temp_config("collector:\n  req_host: [not valid yaml\n");

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .failure();
}

/// Test that invalid port (0) is rejected
#[test]
fn test_invalid_port_zero() {
    let file = create_temp_config("server:\n  port: 0\n");

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .failure();
}

/// Test that a missing config file falls back to defaults
#[test]
fn test_missing_config_file_uses_defaults() {
    cmd()
        .arg("-c")
        .arg("/nonexistent/path/config.yaml")
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "http://127.0.0.1:80/status/format/json",
        ));
}

/// Test --once prints the published lines for one cycle
#[tokio::test(flavor = "multi_thread")]
async fn test_once_against_mock_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vts/format/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hostName": "h1",
            "connections": {
                "active": 1, "reading": 0, "writing": 1, "waiting": 2,
                "handled": 10, "accepted": 10, "requests": 100
            }
        })))
        .mount(&mock_server)
        .await;

    let address = *mock_server.address();

    cmd()
        .arg("-c")
        .arg("/nonexistent/path/config.yaml")
        .args(["--req-host", &address.ip().to_string()])
        .args(["--req-port", &address.port().to_string()])
        .args(["--req-path", "/vts/format/json", "--once"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("nginxvts.h1.conn.active 1 "))
        .stdout(predicate::str::contains("nginxvts.h1.conn.requests 100 "))
        .stdout(predicate::str::contains("vhosts").not());
}

/// Test --once exits non-zero when the endpoint is unreachable
#[test]
fn test_once_unreachable_endpoint() {
    cmd()
        .arg("-c")
        .arg("/nonexistent/path/config.yaml")
        .args(["--req-host", "127.0.0.1", "--req-port", "1", "--once"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}
