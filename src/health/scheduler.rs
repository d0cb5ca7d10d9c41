//! Aggregation scheduler
//!
//! Drives one pass over the registry: every check runs concurrently through
//! the executor, the pass finishes when the last outcome is in, and the
//! result is one complete [`HealthReport`].

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::descriptor::CheckDescriptor;
use super::executor;
use super::registry::CheckRegistry;
use super::types::{HealthReport, HealthStatus};
use crate::system::metrics;

/// Runs aggregation passes over a shared, read-only registry
#[derive(Debug, Clone)]
pub struct HealthService {
    registry: Arc<CheckRegistry>,
    started_at: Instant,
}

impl HealthService {
    /// Create a service over a fully built registry
    pub fn new(registry: Arc<CheckRegistry>) -> Self {
        Self {
            registry,
            started_at: Instant::now(),
        }
    }

    /// The registry this service runs
    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Time since the service was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Run every registered check once
    pub async fn check_health(&self) -> HealthReport {
        self.check_health_matching(|_| true).await
    }

    /// Run only the checks carrying `tag`
    pub async fn check_health_tagged(&self, tag: &str) -> HealthReport {
        self.check_health_matching(|d| d.has_tag(tag)).await
    }

    /// Run the checks selected by `predicate` concurrently
    ///
    /// The report holds exactly one entry per selected check. Slow checks
    /// never delay the others; the pass is bounded by the slowest timeout.
    pub async fn check_health_matching<P>(&self, predicate: P) -> HealthReport
    where
        P: Fn(&CheckDescriptor) -> bool,
    {
        let pass_id = Uuid::new_v4();
        let checks: Vec<Arc<CheckDescriptor>> = self
            .registry
            .list()
            .into_iter()
            .filter(|d| predicate(d))
            .collect();

        let span = info_span!("health_pass", %pass_id, checks = checks.len());
        async move {
            let started = Instant::now();
            let outcomes = join_all(checks.iter().map(|descriptor| async move {
                (descriptor.name().to_string(), executor::execute(descriptor).await)
            }))
            .await;
            let total_duration = started.elapsed();

            let entries: BTreeMap<_, _> = outcomes.into_iter().collect();
            let report = HealthReport::new(entries, total_duration);
            metrics::record_pass(&report);

            match report.status() {
                HealthStatus::Healthy => info!(
                    status = %report.status(),
                    duration = ?total_duration,
                    "Health pass complete"
                ),
                status => warn!(
                    %status,
                    unhealthy = report.count(HealthStatus::Unhealthy),
                    degraded = report.count(HealthStatus::Degraded),
                    duration = ?total_duration,
                    "Health pass complete with problems"
                ),
            }

            report
        }
        .instrument(span)
        .await
    }
}
