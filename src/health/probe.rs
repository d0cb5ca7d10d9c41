//! The probe capability and its closure adapters

use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;

use super::types::ProbeReport;

/// What a probe returns: a report, or a failure for the executor to normalize
pub type ProbeResult = std::result::Result<ProbeReport, ProbeError>;

/// Failures raised by probe bodies
///
/// These never leave the probe executor; they end up as the `error` text of
/// an unhealthy outcome.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// I/O failure while talking to the dependency
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The dependency answered with something unexpected
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The probe body panicked
    #[error("Probe panicked: {0}")]
    Panicked(String),

    /// Anything else
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

/// A single health probe
///
/// Every kind of check (database, external API, resource metrics) is driven
/// through this one capability. Implementations should release whatever they
/// allocate on drop, because the executor drops the future on timeout.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Run the probe once
    async fn check(&self) -> ProbeResult;
}

/// Adapter for synchronous probe closures
///
/// The closure runs on tokio's blocking pool. A timeout abandons it, but a
/// blocking call cannot be interrupted: the thread keeps running until the
/// closure returns and its result is then thrown away.
pub struct FnProbe<F> {
    f: Arc<F>,
}

impl<F> FnProbe<F>
where
    F: Fn() -> ProbeResult + Send + Sync + 'static,
{
    /// Wrap a synchronous closure
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> HealthProbe for FnProbe<F>
where
    F: Fn() -> ProbeResult + Send + Sync + 'static,
{
    async fn check(&self) -> ProbeResult {
        let f = Arc::clone(&self.f);
        match tokio::task::spawn_blocking(move || f()).await {
            Ok(result) => result,
            Err(e) => Err(ProbeError::Panicked(panic_message(e))),
        }
    }
}

/// Adapter for async probe closures
pub struct AsyncFnProbe<F> {
    f: F,
}

impl<F, Fut> AsyncFnProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    /// Wrap a closure returning a future
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> HealthProbe for AsyncFnProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    async fn check(&self) -> ProbeResult {
        (self.f)().await
    }
}

/// Shorthand for `Arc::new(FnProbe::new(f))`
pub fn probe_fn<F>(f: F) -> Arc<dyn HealthProbe>
where
    F: Fn() -> ProbeResult + Send + Sync + 'static,
{
    Arc::new(FnProbe::new(f))
}

/// Shorthand for `Arc::new(AsyncFnProbe::new(f))`
pub fn async_probe_fn<F, Fut>(f: F) -> Arc<dyn HealthProbe>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    Arc::new(AsyncFnProbe::new(f))
}

/// Extract a readable message from a failed task
pub(crate) fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload: Box<dyn Any + Send> = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
