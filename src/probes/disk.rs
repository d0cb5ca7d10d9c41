//! Disk free space probe

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

use super::run_blocking;
use crate::health::{HealthProbe, ProbeError, ProbeReport, ProbeResult};

const GB: u64 = 1024 * 1024 * 1024;

/// Checks the free space of the disk holding a path
#[derive(Debug, Clone)]
pub struct DiskProbe {
    path: PathBuf,
    min_free_gb: u64,
}

impl DiskProbe {
    /// Unhealthy once the disk holding `path` has `min_free_gb` or less available
    pub fn new(path: impl Into<PathBuf>, min_free_gb: u64) -> Self {
        Self {
            path: path.into(),
            min_free_gb,
        }
    }
}

/// Available bytes on the disk whose mount point is the longest prefix of `path`
pub fn available_space(path: &Path) -> std::result::Result<u64, ProbeError> {
    let path = std::fs::canonicalize(path)?;
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
        .ok_or_else(|| ProbeError::protocol(format!("no disk mounted for {}", path.display())))
}

/// Map a measurement to a report
pub fn evaluate(free_gb: u64, min_free_gb: u64) -> ProbeReport {
    if free_gb > min_free_gb {
        ProbeReport::healthy(format!("Disk space available: {free_gb}GB"))
    } else {
        ProbeReport::unhealthy(format!("Low disk space: {free_gb}GB"))
    }
}

#[async_trait]
impl HealthProbe for DiskProbe {
    async fn check(&self) -> ProbeResult {
        let path = self.path.clone();
        let free_gb = run_blocking(move || available_space(&path)).await? / GB;
        Ok(evaluate(free_gb, self.min_free_gb))
    }
}
