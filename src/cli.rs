//! CLI argument parsing for nginx-vts-collector
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: VTS_CONFIG)
//! - `--req-host`: Status endpoint host (env: VTS_REQ_HOST)
//! - `--req-port`: Status endpoint port (env: VTS_REQ_PORT)
//! - `--req-path`: Status endpoint path (env: VTS_REQ_PATH)
//! - `--req-ssl`: Use https for the status endpoint (env: VTS_REQ_SSL)
//! - `--req-host-header`: HTTP Host header to send (env: VTS_REQ_HOST_HEADER)
//! - `--precision`: Decimal places for published values (env: VTS_PRECISION)
//! - `--interval`: Collection interval in seconds (env: VTS_INTERVAL)
//! - `--port` / `-p`: Server port (env: VTS_PORT)
//! - `--bind-address`: Server bind address (env: VTS_BIND_ADDRESS)
//! - `--once`: Run a single collection cycle and print the result
//! - `--validate`: Validate configuration without starting
//! - `--output-format`: Output format for validate (text/json/yaml)
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: VTS_LOG_LEVEL)
//! - `--log-format`: Log output format (text/json, env: VTS_LOG_FORMAT)
//!
//! # Precedence
//!
//! Configuration values are resolved in the following order (highest to lowest priority):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// nginx-vts-collector - nginx vhost traffic status collector
///
/// Polls the nginx VTS JSON status page and republishes connection,
/// virtual-host and upstream statistics as counters and gauges.
#[derive(Parser, Debug)]
#[command(name = "nginx-vts-collector")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "VTS_CONFIG"
    )]
    pub config: PathBuf,

    /// Status endpoint host (overrides config file)
    #[arg(long, value_name = "HOST", env = "VTS_REQ_HOST")]
    pub req_host: Option<String>,

    /// Status endpoint port (overrides config file)
    #[arg(long, value_name = "PORT", env = "VTS_REQ_PORT")]
    pub req_port: Option<u16>,

    /// Status endpoint path (overrides config file)
    #[arg(long, value_name = "PATH", env = "VTS_REQ_PATH")]
    pub req_path: Option<String>,

    /// Use https for the status endpoint (overrides config file)
    /// Accepts true/false, yes/no, on/off or 1/0, as the config file does
    #[arg(long, value_name = "BOOL", env = "VTS_REQ_SSL", value_parser = parse_ssl)]
    pub req_ssl: Option<bool>,

    /// HTTP Host header sent to the status endpoint (overrides config file)
    #[arg(long, value_name = "HOST", env = "VTS_REQ_HOST_HEADER")]
    pub req_host_header: Option<String>,

    /// Number of decimal places for published values (overrides config file)
    #[arg(long, value_name = "DIGITS", env = "VTS_PRECISION")]
    pub precision: Option<u8>,

    /// Collection interval in seconds (overrides config file)
    #[arg(long, value_name = "SECS", env = "VTS_INTERVAL")]
    pub interval: Option<u64>,

    /// Server port (overrides config file)
    #[arg(short, long, value_name = "PORT", env = "VTS_PORT")]
    pub port: Option<u16>,

    /// Server bind address (overrides config file)
    /// Supported values: IP addresses (0.0.0.0, 127.0.0.1, ::1) or "localhost"
    #[arg(long, value_name = "ADDRESS", env = "VTS_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Run a single collection cycle, print the published metrics and exit
    #[arg(long, conflicts_with = "validate")]
    pub once: bool,

    /// Validate configuration without starting
    #[arg(long)]
    pub validate: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "VTS_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "VTS_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Output format for --validate
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

fn parse_ssl(value: &str) -> Result<bool, String> {
    crate::config::loose::parse_bool(value)
        .ok_or_else(|| "expected true/false, yes/no, on/off or 1/0".to_string())
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Output format options for validate mode
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
