//! Probe executor: one descriptor in, one outcome out, whatever happens
//!
//! The probe runs as its own task raced against the descriptor's timeout.
//! Errors, panics and timeouts all come back as unhealthy outcomes; nothing
//! raised by a probe propagates past this function.

use std::time::Instant;
use tracing::{debug, warn};

use super::descriptor::CheckDescriptor;
use super::probe::panic_message;
use super::types::CheckOutcome;
use crate::system::metrics::{self, CheckEnd};

/// Run one check to completion or timeout
///
/// On timeout the probe task is aborted. Cancellation is cooperative: an
/// async probe is dropped at its next await point, a blocking probe keeps its
/// thread until it returns on its own.
pub async fn execute(descriptor: &CheckDescriptor) -> CheckOutcome {
    let name = descriptor.name();
    let timeout = descriptor.timeout();
    let probe = descriptor.probe().clone();

    let started = Instant::now();
    let mut task = tokio::spawn(async move { probe.check().await });

    let (outcome, end) = match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(report))) => {
            let outcome = CheckOutcome::completed(report, started.elapsed());
            debug!(
                check = name,
                status = %outcome.status,
                duration = ?outcome.duration,
                "Health check completed"
            );
            (outcome, CheckEnd::Completed)
        }
        Ok(Ok(Err(err))) => {
            warn!(check = name, error = %err, "Health check failed");
            let outcome = CheckOutcome::failed(name, err.to_string(), started.elapsed());
            (outcome, CheckEnd::Failed)
        }
        Ok(Err(join_err)) => {
            let msg = panic_message(join_err);
            warn!(check = name, error = %msg, "Health check panicked");
            let outcome =
                CheckOutcome::failed(name, format!("Probe panicked: {msg}"), started.elapsed());
            (outcome, CheckEnd::Failed)
        }
        Err(_) => {
            task.abort();
            warn!(check = name, timeout = ?timeout, "Health check timed out");
            (CheckOutcome::timed_out(name, timeout), CheckEnd::TimedOut)
        }
    };

    metrics::record_check(name, &outcome, end);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probe::{async_probe_fn, probe_fn, ProbeError};
    use crate::health::types::{HealthStatus, ProbeReport};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completed_probe_is_verbatim() {
        let descriptor = CheckDescriptor::new(
            "Memory Usage",
            probe_fn(|| Ok(ProbeReport::degraded("Memory usage is 420MB"))),
        )
        .with_timeout(Duration::from_secs(1));

        let outcome = execute(&descriptor).await;
        assert_eq!(outcome.status, HealthStatus::Degraded);
        assert_eq!(outcome.description, "Memory usage is 420MB");
        assert_eq!(outcome.error, None);
        assert!(outcome.duration < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_probe_error_becomes_unhealthy() {
        let descriptor = CheckDescriptor::new(
            "External API",
            async_probe_fn(|| async {
                Err(ProbeError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )))
            }),
        )
        .with_timeout(Duration::from_secs(1));

        let outcome = execute(&descriptor).await;
        assert_eq!(outcome.status, HealthStatus::Unhealthy);
        assert_eq!(outcome.description, "External API failed");
        let error = outcome.error.unwrap();
        assert!(error.contains("connection refused"), "{error}");
    }

    async fn explode() -> crate::health::probe::ProbeResult {
        panic!("index out of range")
    }

    #[tokio::test]
    async fn test_panicking_probe_becomes_unhealthy() {
        let descriptor = CheckDescriptor::new("Flaky", async_probe_fn(explode))
            .with_timeout(Duration::from_secs(1));

        let outcome = execute(&descriptor).await;
        assert_eq!(outcome.status, HealthStatus::Unhealthy);
        assert_eq!(outcome.description, "Flaky failed");
        assert!(outcome.error.unwrap().contains("index out of range"));
    }

    #[tokio::test]
    async fn test_timeout_reports_configured_duration() {
        let timeout = Duration::from_millis(50);
        let descriptor = CheckDescriptor::new(
            "Database",
            async_probe_fn(|| std::future::pending()),
        )
        .with_timeout(timeout);

        let outcome = execute(&descriptor).await;
        assert_eq!(outcome.status, HealthStatus::Unhealthy);
        assert_eq!(outcome.description, "Database timed out");
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.duration, timeout);
    }

    #[tokio::test]
    async fn test_timed_out_async_probe_is_dropped() {
        struct SetOnDrop(Arc<AtomicBool>);
        impl Drop for SetOnDrop {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = dropped.clone();
        let descriptor = CheckDescriptor::new(
            "Hanging",
            async_probe_fn(move || {
                let guard = SetOnDrop(flag.clone());
                async move {
                    let _guard = guard;
                    std::future::pending::<()>().await;
                    Ok(ProbeReport::healthy("unreachable"))
                }
            }),
        )
        .with_timeout(Duration::from_millis(20));

        execute(&descriptor).await;
        // abort is processed by the runtime shortly after the timeout fires
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(dropped.load(Ordering::SeqCst));
    }
}
