//! Status, outcome and report types shared by the engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::combinator;

/// Health status levels, ordered from most to least severe
///
/// The derived ordering places `Unhealthy` lowest so the overall status of a
/// report is simply the minimum over its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Component is failing or unreachable
    Unhealthy,
    /// Component works but below expectations
    Degraded,
    /// Component is operating normally
    Healthy,
}

impl HealthStatus {
    /// Status name as rendered on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Healthy => "Healthy",
        }
    }

    /// Numeric severity used by metrics (0 healthy, 1 degraded, 2 unhealthy)
    pub fn severity(&self) -> i64 {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result returned by a probe that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Reported status
    pub status: HealthStatus,
    /// Human readable description
    pub description: String,
    /// Optional diagnostic attached to a non-healthy report
    pub error: Option<String>,
}

impl ProbeReport {
    /// Healthy report with a description
    pub fn healthy(description: impl Into<String>) -> Self {
        Self::new(HealthStatus::Healthy, description)
    }

    /// Degraded report with a description
    pub fn degraded(description: impl Into<String>) -> Self {
        Self::new(HealthStatus::Degraded, description)
    }

    /// Unhealthy report with a description
    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self::new(HealthStatus::Unhealthy, description)
    }

    fn new(status: HealthStatus, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
            error: None,
        }
    }

    /// Attach a diagnostic, e.g. the error that made the probe unhealthy
    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Normalized result of a single check; always present in a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Check status
    pub status: HealthStatus,
    /// Human readable description
    pub description: String,
    /// Failure detail, if any
    pub error: Option<String>,
    /// Time spent on the check
    pub duration: Duration,
}

impl CheckOutcome {
    /// Outcome of a probe that returned before its deadline
    pub fn completed(report: ProbeReport, duration: Duration) -> Self {
        Self {
            status: report.status,
            description: report.description,
            error: report.error,
            duration,
        }
    }

    /// Outcome of a probe that raised a failure
    pub fn failed(check: &str, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: format!("{check} failed"),
            error: Some(error.into()),
            duration,
        }
    }

    /// Outcome of a probe that exceeded its timeout
    pub fn timed_out(check: &str, timeout: Duration) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: format!("{check} timed out"),
            error: None,
            duration: timeout,
        }
    }
}

/// Combined result of one aggregation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    status: HealthStatus,
    total_duration: Duration,
    entries: BTreeMap<String, CheckOutcome>,
}

impl HealthReport {
    /// Build a report; the overall status is derived from the entries
    pub fn new(entries: BTreeMap<String, CheckOutcome>, total_duration: Duration) -> Self {
        let status = combinator::combine(entries.values().map(|outcome| outcome.status));
        Self {
            status,
            total_duration,
            entries,
        }
    }

    /// Overall status
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Wall-clock duration of the pass
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Per-check outcomes keyed by check name
    pub fn entries(&self) -> &BTreeMap<String, CheckOutcome> {
        &self.entries
    }

    /// Outcome of a single check
    pub fn entry(&self, name: &str) -> Option<&CheckOutcome> {
        self.entries.get(name)
    }

    /// Number of entries with the given status
    pub fn count(&self, status: HealthStatus) -> usize {
        self.entries.values().filter(|o| o.status == status).count()
    }

    /// Whether the service should keep receiving traffic (healthy or degraded)
    pub fn is_operational(&self) -> bool {
        self.status != HealthStatus::Unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: HealthStatus) -> CheckOutcome {
        CheckOutcome::completed(
            ProbeReport {
                status,
                description: status.to_string(),
                error: None,
            },
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_status_ordering_puts_unhealthy_first() {
        assert!(HealthStatus::Unhealthy < HealthStatus::Degraded);
        assert!(HealthStatus::Degraded < HealthStatus::Healthy);
    }

    #[test]
    fn test_failed_and_timed_out_descriptions_differ() {
        let failed = CheckOutcome::failed("Database", "connection refused", Duration::from_millis(3));
        let timed_out = CheckOutcome::timed_out("Database", Duration::from_secs(5));

        assert_eq!(failed.description, "Database failed");
        assert_eq!(failed.error.as_deref(), Some("connection refused"));
        assert_eq!(timed_out.description, "Database timed out");
        assert_eq!(timed_out.error, None);
        assert_eq!(timed_out.duration, Duration::from_secs(5));
    }

    #[test]
    fn test_report_status_derived_from_entries() {
        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), outcome(HealthStatus::Healthy));
        entries.insert("b".to_string(), outcome(HealthStatus::Degraded));
        let report = HealthReport::new(entries, Duration::from_millis(10));

        assert_eq!(report.status(), HealthStatus::Degraded);
        assert!(report.is_operational());
        assert_eq!(report.count(HealthStatus::Degraded), 1);
        assert_eq!(report.entries().len(), 2);
    }

    #[test]
    fn test_probe_report_with_error() {
        let report = ProbeReport::unhealthy("Database connection failed").with_error("refused");
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.error.as_deref(), Some("refused"));
    }
}
