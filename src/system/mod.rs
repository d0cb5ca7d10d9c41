//! System utilities and monitoring
//!
//! Prometheus metrics fed by the aggregation engine.

pub mod metrics;
