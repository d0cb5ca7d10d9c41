//! Health Aggregator Server
//!
//! Loads configuration, registers the built-in probes and serves the
//! aggregated health report over HTTP.

use clap::{Arg, ArgMatches, Command};
use health_aggregator::{
    api::{create_app, start_server},
    core::Config,
    probes, CheckRegistry, Error, HealthService, Result,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

// Configure global allocator for maximum performance
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("health-aggregator")
        .version(health_aggregator::VERSION)
        .about("Runs registered health checks concurrently and serves the combined report.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address"),
        )
        .arg(
            Arg::new("default-timeout")
                .long("default-timeout")
                .value_name("DURATION")
                .help("Timeout for checks without their own (e.g. 30s, 500ms)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    health_aggregator::init(&config.logging)?;

    let mut registry = CheckRegistry::with_default_timeout(config.health.default_timeout);
    probes::register_configured(&mut registry, &config.checks)?;
    if registry.is_empty() {
        warn!("No health checks enabled; /health will always report Healthy");
    }

    let health = Arc::new(HealthService::new(Arc::new(registry)));
    let app = create_app(health, config.metrics.enabled);

    start_server(config.server.http_addr, app, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr
            .parse()
            .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(timeout) = matches.get_one::<String>("default-timeout") {
        config.health.default_timeout = health_aggregator::core::config::parse_duration(timeout)
            .map_err(|e| Error::config(format!("Invalid default timeout: {}", e)))?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
    warn!("Received shutdown signal, initiating graceful shutdown...");
}
