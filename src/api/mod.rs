//! # API Module
//!
//! HTTP host for the aggregation engine.
//!
//! ## Endpoints
//! - `GET /health` - Run all checks, JSON report (200 healthy/degraded, 503 unhealthy)
//! - `GET /health?tag={tag}` - Same, restricted to checks carrying `tag`
//! - `GET /health/live` - Liveness, runs no checks
//! - `GET /metrics` - Prometheus metrics (when enabled)
//! - `GET /` - Service info and registered checks

pub mod handlers;
pub mod server;

// Re-export commonly used items
pub use handlers::status_code_for;
pub use server::{create_app, start_server};
