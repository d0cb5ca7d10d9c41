//! Error types and handling for the health aggregator
//!
//! Only registration and startup can fail. Failures raised by individual
//! probes never surface here: the executor turns them into unhealthy outcomes.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the health aggregator
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A check with this name is already registered
    #[error("Duplicate check name: {0}")]
    DuplicateCheckName(String),

    /// Check descriptor rejected at registration
    #[error("Invalid check: {0}")]
    InvalidCheck(String),

    /// HTTP server failures
    #[error("Server error: {0}")]
    Server(String),

    /// JSON report encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a duplicate check name error
    pub fn duplicate_check(name: impl Into<String>) -> Self {
        Self::DuplicateCheckName(name.into())
    }

    /// Create an invalid check error
    pub fn invalid_check(msg: impl Into<String>) -> Self {
        Self::InvalidCheck(msg.into())
    }

    /// Create a server error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}
