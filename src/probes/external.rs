//! External HTTP dependency probe

use async_trait::async_trait;
use reqwest::Client;

use crate::health::{HealthProbe, ProbeError, ProbeReport, ProbeResult};

/// Issues a GET request and checks for a success status
///
/// Transport failures (DNS, TLS, refused connections) are raised as probe
/// errors and reported by the executor as `"<check> failed"`.
#[derive(Debug, Clone)]
pub struct ExternalApiProbe {
    client: Client,
    url: String,
}

impl ExternalApiProbe {
    /// Probe `url` with a fresh client
    pub fn new(url: impl Into<String>) -> std::result::Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, url))
    }

    /// Probe `url` with an existing client
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HealthProbe for ExternalApiProbe {
    async fn check(&self) -> ProbeResult {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(ProbeReport::healthy("API is reachable"))
        } else {
            Ok(ProbeReport::unhealthy("API is down").with_error(format!("HTTP {status}")))
        }
    }
}
