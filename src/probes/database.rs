//! Database reachability probe
//!
//! Reachability only: a TCP connection to the database endpoint is opened and
//! closed again. Speaking the database's wire protocol is the driver's job.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::health::{HealthProbe, ProbeReport, ProbeResult};

/// Opens a TCP connection to the configured database address
#[derive(Debug, Clone)]
pub struct DatabaseProbe {
    address: String,
    connect_timeout: Duration,
}

impl DatabaseProbe {
    /// Probe `address` (`host:port`), giving up on the connection after `connect_timeout`
    pub fn new(address: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            address: address.into(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl HealthProbe for DatabaseProbe {
    async fn check(&self) -> ProbeResult {
        let attempt = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address));
        let report = match attempt.await {
            // the stream is dropped right away, closing the connection
            Ok(Ok(_stream)) => ProbeReport::healthy("Database is reachable"),
            Ok(Err(e)) => ProbeReport::unhealthy("Database connection failed").with_error(e),
            Err(_) => ProbeReport::unhealthy("Database connection failed").with_error(format!(
                "no connection to {} within {:?}",
                self.address, self.connect_timeout
            )),
        };
        Ok(report)
    }
}
