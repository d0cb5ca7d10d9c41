//! Process CPU probe
//!
//! Usage is a rate: the process's CPU time is sampled twice, `sample_interval`
//! apart, and the result is scaled to the whole machine (100% means every core
//! busy with this process).

use async_trait::async_trait;
use std::time::Duration;
use sysinfo::System;

use super::{current_pid, run_blocking};
use crate::health::{HealthProbe, ProbeError, ProbeReport, ProbeResult};

/// Shortest window that yields a meaningful sample
const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Compares this process's recent CPU usage against a limit
#[derive(Debug, Clone)]
pub struct CpuProbe {
    threshold_percent: f64,
    sample_interval: Duration,
}

impl CpuProbe {
    /// Unhealthy once usage over `sample_interval` reaches `threshold_percent`
    pub fn new(threshold_percent: f64, sample_interval: Duration) -> Self {
        Self {
            threshold_percent,
            sample_interval: sample_interval.max(MIN_SAMPLE_INTERVAL),
        }
    }

    /// Window between the two samples
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    async fn sample(&self) -> std::result::Result<f64, ProbeError> {
        let pid = current_pid()?;
        let sys = run_blocking(move || {
            let mut sys = System::new();
            sys.refresh_cpu();
            sys.refresh_process(pid);
            Ok(sys)
        })
        .await?;

        tokio::time::sleep(self.sample_interval).await;

        let per_core = run_blocking(move || {
            let mut sys = sys;
            sys.refresh_cpu();
            sys.refresh_process(pid);
            sys.process(pid)
                .map(|process| process.cpu_usage())
                .ok_or_else(|| ProbeError::protocol("current process not found in process table"))
        })
        .await?;

        Ok(f64::from(per_core) / num_cpus::get().max(1) as f64)
    }
}

/// Map a measurement to a report
pub fn evaluate(usage_percent: f64, threshold_percent: f64) -> ProbeReport {
    if usage_percent < threshold_percent {
        ProbeReport::healthy(format!("CPU usage is {usage_percent:.1}%"))
    } else {
        ProbeReport::unhealthy(format!("High CPU usage: {usage_percent:.1}%"))
    }
}

#[async_trait]
impl HealthProbe for CpuProbe {
    async fn check(&self) -> ProbeResult {
        let usage = self.sample().await?;
        Ok(evaluate(usage, self.threshold_percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;

    #[test]
    fn test_evaluate_threshold() {
        let report = evaluate(12.345, 80.0);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.description, "CPU usage is 12.3%");

        let report = evaluate(80.0, 80.0);
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.description, "High CPU usage: 80.0%");
    }

    #[test]
    fn test_sample_interval_has_floor() {
        let probe = CpuProbe::new(80.0, Duration::from_millis(1));
        assert_eq!(probe.sample_interval(), MIN_SAMPLE_INTERVAL);
    }

    #[tokio::test]
    async fn test_sampled_usage_is_a_percentage() {
        let probe = CpuProbe::new(100.0, MIN_SAMPLE_INTERVAL);
        let usage = probe.sample().await.unwrap();
        assert!((0.0..=100.0).contains(&usage), "usage {usage}");
    }
}
