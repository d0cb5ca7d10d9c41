//! Core system types and foundations
//!
//! This module contains the error type and configuration shared by the
//! aggregation engine, the built-in probes and the HTTP host.

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::Config;
pub use error::{Error, Result};
