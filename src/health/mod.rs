//! Health-check aggregation engine
//!
//! - [`registry`]: the set of named checks, built once at startup
//! - [`executor`]: runs one probe under its timeout and normalizes the result
//! - [`scheduler`]: runs every check concurrently and builds the report
//! - [`combinator`]: derives the overall status, most severe first
//! - [`report`]: the JSON wire format
//!
//! ```no_run
//! use health_aggregator::health::{probe_fn, CheckRegistry, HealthService, ProbeReport};
//! use std::sync::Arc;
//!
//! # async fn run() -> health_aggregator::Result<()> {
//! let mut registry = CheckRegistry::new();
//! registry.add_check("Cache", probe_fn(|| Ok(ProbeReport::healthy("Cache is warm"))))?;
//!
//! let service = HealthService::new(Arc::new(registry));
//! let report = service.check_health().await;
//! println!("{}", health_aggregator::health::report::to_json(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod combinator;
pub mod descriptor;
pub mod executor;
pub mod probe;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod types;

pub use descriptor::CheckDescriptor;
pub use probe::{async_probe_fn, probe_fn, AsyncFnProbe, FnProbe, HealthProbe, ProbeError, ProbeResult};
pub use registry::{CheckRegistry, DEFAULT_CHECK_TIMEOUT};
pub use scheduler::HealthService;
pub use types::{CheckOutcome, HealthReport, HealthStatus, ProbeReport};
