//! Health Aggregator - concurrent health checks behind one JSON endpoint
//!
//! A registry of independent probes (database reachability, external
//! dependencies, process memory and CPU, disk space) is run concurrently, each
//! under its own timeout. The outcomes are combined into one overall status,
//! most severe first, and served on `GET /health`.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod api;
pub mod health;
pub mod probes;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, Result};
pub use health::{CheckRegistry, HealthReport, HealthService, HealthStatus};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing and metrics
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(logging: &core::config::LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .map_err(|e| Error::config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match logging.format.as_str() {
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };
    installed.map_err(|e| Error::config(format!("Cannot install logger: {}", e)))?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);

    system::metrics::init_registry();

    Ok(())
}
