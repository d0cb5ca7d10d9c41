//! HTTP request handlers for the health endpoints

use axum::{
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::error;

use crate::core::config::format_duration;
use crate::health::{report, HealthReport, HealthService};
use crate::system::metrics;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Query parameters accepted by `GET /health`
#[derive(Debug, Default, Deserialize)]
pub struct HealthQuery {
    /// Only run checks carrying this tag
    pub tag: Option<String>,
}

/// Service description returned by `GET /`
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Crate name
    pub name: String,
    /// Crate version
    pub version: String,
    /// Seconds since startup
    pub uptime_secs: u64,
    /// Registered checks
    pub checks: Vec<CheckInfo>,
}

/// One registered check as listed by `GET /`
#[derive(Debug, Serialize)]
pub struct CheckInfo {
    /// Check name
    pub name: String,
    /// Check tags
    pub tags: BTreeSet<String>,
    /// Check timeout, e.g. `"5s"`
    pub timeout: String,
}

/// HTTP status for a report
///
/// Degraded still serves traffic, so only Unhealthy maps to 503.
pub fn status_code_for(report: &HealthReport) -> StatusCode {
    if report.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// `GET /health`: run one aggregation pass and render the report
pub async fn health_check(
    State(health): State<Arc<HealthService>>,
    Query(query): Query<HealthQuery>,
) -> Response {
    let report = match query.tag.as_deref() {
        Some(tag) => health.check_health_tagged(tag).await,
        None => health.check_health().await,
    };

    match report::to_json_bytes(&report) {
        Ok(body) => (
            status_code_for(&report),
            [(CONTENT_TYPE, "application/json"), (CACHE_CONTROL, NO_CACHE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize health report: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render health report").into_response()
        }
    }
}

/// `GET /health/live`: the process is up, no checks are run
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, [(CACHE_CONTROL, NO_CACHE)], "Alive")
}

/// `GET /metrics`: Prometheus text exposition
pub async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::collect_metrics(),
    )
}

/// `GET /`: service name, version and registered checks
pub async fn root_handler(State(health): State<Arc<HealthService>>) -> Json<InfoResponse> {
    let checks = health
        .registry()
        .list()
        .iter()
        .map(|d| CheckInfo {
            name: d.name().to_string(),
            tags: d.tags().clone(),
            timeout: format_duration(d.timeout()),
        })
        .collect();

    Json(InfoResponse {
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: health.uptime().as_secs(),
        checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckOutcome, HealthStatus, ProbeReport};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn report_with(report: ProbeReport) -> HealthReport {
        let mut entries = BTreeMap::new();
        entries.insert(
            "check".to_string(),
            CheckOutcome::completed(report, Duration::from_millis(1)),
        );
        HealthReport::new(entries, Duration::from_millis(1))
    }

    #[test]
    fn test_status_code_policy() {
        assert_eq!(
            status_code_for(&report_with(ProbeReport::healthy("ok"))),
            StatusCode::OK
        );
        assert_eq!(
            status_code_for(&report_with(ProbeReport::degraded("slow"))),
            StatusCode::OK
        );
        let down = report_with(ProbeReport::unhealthy("down"));
        assert_eq!(down.status(), HealthStatus::Unhealthy);
        assert_eq!(status_code_for(&down), StatusCode::SERVICE_UNAVAILABLE);
    }
}
