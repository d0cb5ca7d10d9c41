//! Metrics collection and monitoring for the health aggregator
//!
//! Every aggregation pass and every check execution is recorded in a
//! crate-global Prometheus registry, exposed by the HTTP host on `/metrics`.

use crate::core::Result;
use crate::health::{CheckOutcome, HealthReport};
use once_cell::sync::Lazy;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts,
    Registry,
};

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Buckets for check and pass durations, in seconds
const DURATION_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0];

/// Aggregation pass metrics
pub struct PassMetrics {
    /// Total number of aggregation passes
    pub passes: IntCounter,
    /// Histogram of pass durations in seconds
    pub pass_duration: Histogram,
}

/// Per-check metrics, labelled by check name
pub struct CheckMetrics {
    /// Histogram of check durations in seconds
    pub duration: HistogramVec,
    /// Last observed status (0 healthy, 1 degraded, 2 unhealthy)
    pub status: IntGaugeVec,
    /// Probes that raised a failure or panicked
    pub failures: IntCounterVec,
    /// Probes that exceeded their timeout
    pub timeouts: IntCounterVec,
}

/// Centralized metrics collection for the engine
pub struct Metrics {
    /// Aggregation pass metrics
    pub passes: PassMetrics,
    /// Per-check metrics
    pub checks: CheckMetrics,
}

impl Metrics {
    /// Create new metrics instance registered with the crate registry
    pub fn new() -> Result<Self> {
        Ok(Self {
            passes: PassMetrics::new(&REGISTRY)?,
            checks: CheckMetrics::new(&REGISTRY)?,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> =
            Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
        &INSTANCE
    }
}

impl PassMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let passes = IntCounter::new("ha_passes_total", "Total number of aggregation passes")?;
        let pass_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ha_pass_duration_seconds",
                "Duration of aggregation passes in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(passes.clone()))?;
        registry.register(Box::new(pass_duration.clone()))?;

        Ok(Self {
            passes,
            pass_duration,
        })
    }
}

impl CheckMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "ha_check_duration_seconds",
                "Duration of individual health checks in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["check"],
        )?;
        let status = IntGaugeVec::new(
            Opts::new(
                "ha_check_status",
                "Last status per check (0 healthy, 1 degraded, 2 unhealthy)",
            ),
            &["check"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("ha_check_failures_total", "Probes that raised a failure"),
            &["check"],
        )?;
        let timeouts = IntCounterVec::new(
            Opts::new("ha_check_timeouts_total", "Probes that exceeded their timeout"),
            &["check"],
        )?;

        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(status.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(timeouts.clone()))?;

        Ok(Self {
            duration,
            status,
            failures,
            timeouts,
        })
    }
}

/// How a check execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckEnd {
    /// The probe returned a report
    Completed,
    /// The probe raised a failure or panicked
    Failed,
    /// The probe was abandoned at its timeout
    TimedOut,
}

/// Record the outcome of one check execution
pub fn record_check(name: &str, outcome: &CheckOutcome, end: CheckEnd) {
    let checks = &Metrics::global().checks;
    checks
        .duration
        .with_label_values(&[name])
        .observe(outcome.duration.as_secs_f64());
    checks
        .status
        .with_label_values(&[name])
        .set(outcome.status.severity());
    match end {
        CheckEnd::Completed => {}
        CheckEnd::Failed => checks.failures.with_label_values(&[name]).inc(),
        CheckEnd::TimedOut => checks.timeouts.with_label_values(&[name]).inc(),
    }
}

/// Record a finished aggregation pass
pub fn record_pass(report: &HealthReport) {
    let passes = &Metrics::global().passes;
    passes.passes.inc();
    passes
        .pass_duration
        .observe(report.total_duration().as_secs_f64());
}

/// Initialize the metrics registry by creating the global metrics instance
///
/// Call once during startup so `/metrics` lists every family even before the
/// first pass.
pub fn init_registry() {
    let _ = Metrics::global();
}

/// Get the Prometheus registry holding all engine metrics
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Collect and return all metrics as a Prometheus-formatted string
pub fn collect_metrics() -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = registry().gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
