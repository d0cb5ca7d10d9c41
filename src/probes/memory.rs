//! Process memory probe

use async_trait::async_trait;
use sysinfo::System;

use super::{current_pid, run_blocking};
use crate::health::{HealthProbe, ProbeError, ProbeReport, ProbeResult};

const MB: u64 = 1024 * 1024;

/// Compares this process's resident memory against a limit
#[derive(Debug, Clone)]
pub struct MemoryProbe {
    threshold_mb: u64,
}

impl MemoryProbe {
    /// Unhealthy once resident memory reaches `threshold_mb`
    pub fn new(threshold_mb: u64) -> Self {
        Self { threshold_mb }
    }
}

/// Resident memory of the current process in megabytes
pub fn resident_memory_mb() -> std::result::Result<u64, ProbeError> {
    let pid = current_pid()?;
    let mut sys = System::new();
    sys.refresh_process(pid);
    let process = sys
        .process(pid)
        .ok_or_else(|| ProbeError::protocol("current process not found in process table"))?;
    Ok(process.memory() / MB)
}

/// Map a measurement to a report
pub fn evaluate(used_mb: u64, threshold_mb: u64) -> ProbeReport {
    if used_mb < threshold_mb {
        ProbeReport::healthy(format!("Memory usage is {used_mb}MB"))
    } else {
        ProbeReport::unhealthy(format!("High memory usage: {used_mb}MB"))
    }
}

#[async_trait]
impl HealthProbe for MemoryProbe {
    async fn check(&self) -> ProbeResult {
        let used_mb = run_blocking(resident_memory_mb).await?;
        Ok(evaluate(used_mb, self.threshold_mb))
    }
}
