//! nginx-vts-collector - nginx vhost traffic status collector
//!
//! This binary polls the VTS JSON status page on an interval and serves the
//! published counters and gauges over HTTP, or runs a single cycle with `--once`.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use nginx_vts_collector::cli::{Cli, OutputFormat};
use nginx_vts_collector::collector::Collector;
use nginx_vts_collector::config::Config;
use nginx_vts_collector::publisher::{LineFormatter, SnapshotPublisher};
use nginx_vts_collector::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    nginx_vts_collector::init_logging(&cli.log_level.to_string(), cli.log_format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting nginx-vts-collector"
    );

    // Load configuration, then apply CLI/env overrides
    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_cli(&cli)?;

    if cli.validate {
        print_config(&config, cli.output_format)?;
        return Ok(());
    }

    if cli.once {
        return collect_once(&config).await;
    }

    server::run(config).await
}

/// Run a single cycle and print the published lines to stdout
async fn collect_once(config: &Config) -> Result<()> {
    let collector = Collector::new(&config.collector)?;
    let mut publisher = SnapshotPublisher::from_config(&config.collector);

    let report = collector.collect(&mut publisher).await?;

    print!("{}", LineFormatter::new().format(publisher.metrics()));

    info!(
        host = %report.host_name,
        published = report.published,
        failed_groups = report.failed_groups.len(),
        "Single collection cycle finished"
    );
    Ok(())
}

/// Print the resolved configuration for `--validate`
fn print_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Configuration is valid");
            println!("  status url:  {}", config.collector.status_url());
            if let Some(ref header) = config.collector.req_host_header {
                println!("  host header: {}", header);
            }
            println!("  interval:    {}s", config.collector.interval_secs);
            println!("  path prefix: {}", config.collector.path);
            println!("  precision:   {}", config.collector.precision);
            println!(
                "  listen:      {}:{}{}",
                config.server.bind_address, config.server.port, config.server.path
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(config)?),
    }
    Ok(())
}
