//! Built-in probes and their registration from configuration
//!
//! | Check          | Probe                  | Healthy when                    |
//! |----------------|------------------------|---------------------------------|
//! | `Database`     | [`DatabaseProbe`]      | TCP connect succeeds            |
//! | `External API` | [`ExternalApiProbe`]   | GET returns 2xx                 |
//! | `Memory Usage` | [`MemoryProbe`]        | resident memory below threshold |
//! | `CPU Usage`    | [`CpuProbe`]           | sampled usage below threshold   |
//! | `Disk Space`   | [`DiskProbe`]          | free space above minimum        |

pub mod cpu;
pub mod database;
pub mod disk;
pub mod external;
pub mod memory;

pub use cpu::CpuProbe;
pub use database::DatabaseProbe;
pub use disk::DiskProbe;
pub use external::ExternalApiProbe;
pub use memory::MemoryProbe;

use std::sync::Arc;
use sysinfo::Pid;
use tracing::info;

use crate::core::config::ChecksConfig;
use crate::core::{Error, Result};
use crate::health::probe::panic_message;
use crate::health::{CheckRegistry, ProbeError};

/// Check name of the database probe
pub const DATABASE: &str = "Database";
/// Check name of the external API probe
pub const EXTERNAL_API: &str = "External API";
/// Check name of the memory probe
pub const MEMORY_USAGE: &str = "Memory Usage";
/// Check name of the CPU probe
pub const CPU_USAGE: &str = "CPU Usage";
/// Check name of the disk probe
pub const DISK_SPACE: &str = "Disk Space";

/// Register every enabled built-in probe
pub fn register_configured(registry: &mut CheckRegistry, checks: &ChecksConfig) -> Result<()> {
    let database = &checks.database;
    if database.enabled {
        registry.add_check_with(
            DATABASE,
            database.tags.iter().cloned(),
            Some(database.timeout),
            Arc::new(DatabaseProbe::new(database.address.clone(), database.timeout)),
        )?;
    }

    let api = &checks.external_api;
    if api.enabled {
        let probe = ExternalApiProbe::new(api.url.clone())
            .map_err(|e| Error::config(format!("Cannot build HTTP client: {}", e)))?;
        registry.add_check_with(EXTERNAL_API, api.tags.iter().cloned(), api.timeout, Arc::new(probe))?;
    }

    let memory = &checks.memory;
    if memory.enabled {
        registry.add_check_with(
            MEMORY_USAGE,
            memory.tags.iter().cloned(),
            None,
            Arc::new(MemoryProbe::new(memory.threshold_mb)),
        )?;
    }

    let cpu = &checks.cpu;
    if cpu.enabled {
        registry.add_check_with(
            CPU_USAGE,
            cpu.tags.iter().cloned(),
            None,
            Arc::new(CpuProbe::new(cpu.threshold_percent, cpu.sample_interval)),
        )?;
    }

    let disk = &checks.disk;
    if disk.enabled {
        registry.add_check_with(
            DISK_SPACE,
            disk.tags.iter().cloned(),
            None,
            Arc::new(DiskProbe::new(disk.path.clone(), disk.min_free_gb)),
        )?;
    }

    info!(checks = registry.len(), "Built-in health checks registered");
    Ok(())
}

/// Run a blocking system query on tokio's blocking pool
///
/// Filesystem and process table reads can stall (a hung network mount, for
/// one); off the worker threads a stall only costs the probe its timeout.
pub(crate) async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ProbeError>
where
    F: FnOnce() -> std::result::Result<T, ProbeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ProbeError::Panicked(panic_message(e)))?
}

pub(crate) fn current_pid() -> std::result::Result<Pid, ProbeError> {
    sysinfo::get_current_pid().map_err(|e| ProbeError::protocol(format!("cannot read own pid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_registers_all_probes() {
        let mut registry = CheckRegistry::with_default_timeout(Duration::from_secs(30));
        register_configured(&mut registry, &ChecksConfig::default()).unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec![DATABASE, EXTERNAL_API, MEMORY_USAGE, CPU_USAGE, DISK_SPACE]);

        let db = registry.get(DATABASE).unwrap();
        assert!(db.has_tag("database") && db.has_tag("sql"));
        assert_eq!(db.timeout(), Duration::from_secs(5));
        assert_eq!(registry.get(EXTERNAL_API).unwrap().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_disabled_probes_are_skipped() {
        let mut checks = ChecksConfig::default();
        checks.database.enabled = false;
        checks.external_api.enabled = false;
        checks.cpu.enabled = false;

        let mut registry = CheckRegistry::new();
        register_configured(&mut registry, &checks).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec![MEMORY_USAGE, DISK_SPACE]);
    }

    fn stall() -> std::result::Result<u64, ProbeError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(1)
    }

    #[tokio::test]
    async fn test_blocking_query_leaves_runtime_free() {
        // single-threaded runtime: the timer only fires if the worker is free
        let started = std::time::Instant::now();
        let result = tokio::time::timeout(Duration::from_millis(50), run_blocking(stall)).await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_millis(250));
    }

    fn crash() -> std::result::Result<u64, ProbeError> {
        panic!("statvfs exploded")
    }

    #[tokio::test]
    async fn test_blocking_query_panic_is_reported() {
        match run_blocking(crash).await {
            Err(ProbeError::Panicked(msg)) => assert_eq!(msg, "statvfs exploded"),
            other => panic!("expected panic error, got {:?}", other),
        }
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = CheckRegistry::new();
        register_configured(&mut registry, &ChecksConfig::default()).unwrap();
        let err = register_configured(&mut registry, &ChecksConfig::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateCheckName(ref n) if n == DATABASE));
    }
}
