//! Configuration management for nginx-vts-collector
//!
//! Handles loading and validating configuration from YAML files.
//!
//! `req_ssl`, `req_port` and `precision` may be written either as native YAML
//! values or as strings (`"true"`, `"8080"`); strings are parsed strictly.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::cli::Cli;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Status endpoint and publishing configuration
    #[serde(default)]
    pub collector: CollectorConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Status endpoint and publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Status endpoint host
    #[serde(default = "default_req_host")]
    pub req_host: String,

    /// Status endpoint port
    #[serde(default = "default_req_port", deserialize_with = "loose::port")]
    pub req_port: u16,

    /// Status endpoint path
    #[serde(default = "default_req_path")]
    pub req_path: String,

    /// Use https instead of http
    #[serde(default, deserialize_with = "loose::boolean")]
    pub req_ssl: bool,

    /// HTTP Host header (required for SSL)
    #[serde(default)]
    pub req_host_header: Option<String>,

    /// Number of decimal places to report to
    #[serde(default, deserialize_with = "loose::precision")]
    pub precision: u8,

    /// Namespace prefix for published metrics
    #[serde(default = "default_metric_path")]
    pub path: String,

    /// Collection interval in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// Default value functions
fn default_req_host() -> String {
    "127.0.0.1".to_string()
}

fn default_req_port() -> u16 {
    80
}

fn default_req_path() -> String {
    "/status/format/json".to_string()
}

fn default_metric_path() -> String {
    "nginxvts".to_string()
}

fn default_interval() -> u64 {
    300
}

fn default_timeout() -> u64 {
    5000
}

fn default_port() -> u16 {
    9913
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            req_host: default_req_host(),
            req_port: default_req_port(),
            req_path: default_req_path(),
            req_ssl: false,
            req_host_header: None,
            precision: 0,
            path: default_metric_path(),
            interval_secs: default_interval(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_metrics_path(),
            bind_address: default_bind_address(),
        }
    }
}

impl CollectorConfig {
    /// `http` or `https` depending on `req_ssl`
    pub fn scheme(&self) -> &'static str {
        if self.req_ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Full status endpoint URL
    pub fn status_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme(),
            self.req_host,
            self.req_port,
            self.req_path
        )
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    ///
    /// # Note
    /// - If the file doesn't exist, returns `ConfigError::ReadError`
    /// - Use `Config::load_or_default()` if you want fallback to defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    ///
    /// Use this for optional configuration files (e.g., when running without explicit config)
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Apply CLI/environment overrides and re-validate
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        let collector = &mut self.collector;
        if let Some(ref host) = cli.req_host {
            collector.req_host = host.clone();
        }
        if let Some(port) = cli.req_port {
            collector.req_port = port;
        }
        if let Some(ref path) = cli.req_path {
            collector.req_path = path.clone();
        }
        if let Some(ssl) = cli.req_ssl {
            collector.req_ssl = ssl;
        }
        if let Some(ref header) = cli.req_host_header {
            collector.req_host_header = Some(header.clone());
        }
        if let Some(precision) = cli.precision {
            collector.precision = precision;
        }
        if let Some(interval) = cli.interval {
            collector.interval_secs = interval;
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ref address) = cli.bind_address {
            self.server.bind_address = address.clone();
        }

        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let collector = &self.collector;

        if collector.req_host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "req_host must not be empty".to_string(),
            ));
        }

        if !collector.req_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "req_path must start with '/'".to_string(),
            ));
        }

        if let Err(e) = url::Url::parse(&collector.status_url()) {
            return Err(ConfigError::ValidationError(format!(
                "Status URL '{}' is invalid: {}",
                collector.status_url(),
                e
            )));
        }

        if collector.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "interval_secs must be greater than 0".to_string(),
            ));
        }

        if collector.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "Metrics path must start with '/'".to_string(),
            ));
        }

        if self.server.path == "/" || self.server.path == "/health" {
            return Err(ConfigError::ValidationError(format!(
                "Metrics path '{}' conflicts with a built-in route",
                self.server.path
            )));
        }

        Ok(())
    }
}

/// Strict parsers for values that may arrive as strings
pub(crate) mod loose {
    use super::*;
    use serde::de::Error;
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose<T> {
        Native(T),
        Int(i64),
        Text(String),
    }

    pub(super) fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let invalid = |v: String| {
            D::Error::custom(format!(
                "invalid boolean '{}' (expected true/false, yes/no, on/off or 1/0)",
                v
            ))
        };
        match Loose::<bool>::deserialize(d)? {
            Loose::Native(b) => Ok(b),
            Loose::Int(0) => Ok(false),
            Loose::Int(1) => Ok(true),
            Loose::Int(n) => Err(invalid(n.to_string())),
            Loose::Text(s) => parse_bool(&s).ok_or_else(|| invalid(s.clone())),
        }
    }

    pub(super) fn port<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
        number(d, "port")
    }

    pub(super) fn precision<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        number(d, "precision")
    }

    fn number<'de, D, T>(d: D, what: &str) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr + TryFrom<i64>,
        <T as FromStr>::Err: Display,
        <T as TryFrom<i64>>::Error: Display,
    {
        match Loose::<T>::deserialize(d)? {
            Loose::Native(n) => Ok(n),
            Loose::Int(n) => T::try_from(n)
                .map_err(|e| D::Error::custom(format!("invalid {} '{}': {}", what, n, e))),
            Loose::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid {} '{}': {}", what, s, e))),
        }
    }

    /// `true/false`, `yes/no`, `on/off` or `1/0`, case-insensitive
    pub(crate) fn parse_bool(s: &str) -> Option<bool> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collector.req_host, "127.0.0.1");
        assert_eq!(config.collector.req_port, 80);
        assert_eq!(config.collector.req_path, "/status/format/json");
        assert!(!config.collector.req_ssl);
        assert_eq!(config.collector.req_host_header, None);
        assert_eq!(config.collector.precision, 0);
        assert_eq!(config.server.port, 9913);
        assert_eq!(config.server.path, "/metrics");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_status_url() {
        let mut collector = CollectorConfig::default();
        assert_eq!(
            collector.status_url(),
            "http://127.0.0.1:80/status/format/json"
        );

        collector.req_ssl = true;
        collector.req_host = "nginx.internal".to_string();
        collector.req_port = 443;
        assert_eq!(
            collector.status_url(),
            "https://nginx.internal:443/status/format/json"
        );
    }

    #[test]
    fn test_loose_values_from_strings() {
        let config = Config::from_yaml(
            r#"
collector:
  req_ssl: "True"
  req_port: "8443"
  precision: "2"
"#,
        )
        .unwrap();
        assert!(config.collector.req_ssl);
        assert_eq!(config.collector.req_port, 8443);
        assert_eq!(config.collector.precision, 2);
    }

    #[test]
    fn test_native_values() {
        let config = Config::from_yaml(
            r#"
collector:
  req_ssl: true
  req_port: 8080
  req_host_header: status.example.com
"#,
        )
        .unwrap();
        assert!(config.collector.req_ssl);
        assert_eq!(config.collector.req_port, 8080);
        assert_eq!(
            config.collector.req_host_header.as_deref(),
            Some("status.example.com")
        );
    }

    #[test]
    fn test_unparseable_bool_rejected() {
        let err = Config::from_yaml("collector:\n  req_ssl: \"maybe\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_unparseable_port_rejected() {
        let err = Config::from_yaml("collector:\n  req_port: \"80a\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("80a"));
    }

    #[test]
    fn test_out_of_range_port_rejected() {
        assert!(Config::from_yaml("collector:\n  req_port: \"70000\"\n").is_err());
    }

    #[test]
    fn test_native_integer_bool() {
        let config = Config::from_yaml("collector:\n  req_ssl: 1\n").unwrap();
        assert!(config.collector.req_ssl);

        let config = Config::from_yaml("collector:\n  req_ssl: 0\n").unwrap();
        assert!(!config.collector.req_ssl);

        let err = Config::from_yaml("collector:\n  req_ssl: 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("invalid boolean '2'"));
    }

    #[test]
    fn test_native_out_of_range_numbers_named() {
        let err = Config::from_yaml("collector:\n  req_port: 70000\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("invalid port '70000'"));

        let err = Config::from_yaml("collector:\n  req_port: -1\n").unwrap_err();
        assert!(err.to_string().contains("invalid port '-1'"));

        let err = Config::from_yaml("collector:\n  precision: 300\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("invalid precision '300'"));
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(loose::parse_bool("YES"), Some(true));
        assert_eq!(loose::parse_bool(" off "), Some(false));
        assert_eq!(loose::parse_bool("0"), Some(false));
        assert_eq!(loose::parse_bool("truthy"), None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.collector.req_path = "status".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.collector.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.collector.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.path = "/health".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_cli_overrides() {
        let cli = Cli::parse_from([
            "nginx-vts-collector",
            "--req-host",
            "10.0.0.5",
            "--req-port",
            "8080",
            "--req-ssl",
            "true",
            "--req-host-header",
            "status.example.com",
            "--precision",
            "1",
            "--interval",
            "30",
            "-p",
            "19913",
        ]);

        let mut config = Config::default();
        config.apply_cli(&cli).unwrap();

        assert_eq!(config.collector.req_host, "10.0.0.5");
        assert_eq!(config.collector.req_port, 8080);
        assert!(config.collector.req_ssl);
        assert_eq!(
            config.collector.req_host_header.as_deref(),
            Some("status.example.com")
        );
        assert_eq!(config.collector.precision, 1);
        assert_eq!(config.collector.interval_secs, 30);
        assert_eq!(config.server.port, 19913);
    }
}
