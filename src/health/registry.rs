//! Check registry
//!
//! Built once at startup, then shared read-only (`Arc<CheckRegistry>`) with the
//! scheduler, so every pass sees the same consistent set of checks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::descriptor::CheckDescriptor;
use super::probe::HealthProbe;
use crate::core::{Error, Result};

/// Timeout used when neither the check nor the registry specifies one
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Ordered set of checks keyed by unique name
#[derive(Debug)]
pub struct CheckRegistry {
    checks: Vec<Arc<CheckDescriptor>>,
    names: HashSet<String>,
    default_timeout: Duration,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRegistry {
    /// Empty registry with the built-in default timeout
    pub fn new() -> Self {
        Self::with_default_timeout(DEFAULT_CHECK_TIMEOUT)
    }

    /// Empty registry whose checks default to `timeout`
    pub fn with_default_timeout(timeout: Duration) -> Self {
        Self {
            checks: Vec::new(),
            names: HashSet::new(),
            default_timeout: timeout,
        }
    }

    /// Register a check
    ///
    /// Fails with [`Error::DuplicateCheckName`] when the name is taken; the
    /// registry is left untouched in that case.
    pub fn register(&mut self, descriptor: CheckDescriptor) -> Result<()> {
        let name = descriptor.name();
        if name.trim().is_empty() {
            return Err(Error::invalid_check("check name must not be empty"));
        }
        if self.names.contains(name) {
            return Err(Error::duplicate_check(name));
        }
        let descriptor = descriptor.or_default_timeout(self.default_timeout);
        if descriptor.timeout().is_zero() {
            return Err(Error::invalid_check(format!(
                "check '{}' has a zero timeout",
                descriptor.name()
            )));
        }

        debug!(
            check = descriptor.name(),
            timeout = ?descriptor.timeout(),
            tags = ?descriptor.tags(),
            "Registered health check"
        );
        self.names.insert(descriptor.name().to_string());
        self.checks.push(Arc::new(descriptor));
        Ok(())
    }

    /// Register a probe under `name` with no tags and the default timeout
    pub fn add_check(
        &mut self,
        name: impl Into<String>,
        probe: Arc<dyn HealthProbe>,
    ) -> Result<&mut Self> {
        self.register(CheckDescriptor::new(name, probe))?;
        Ok(self)
    }

    /// Register a probe with optional tags and timeout
    pub fn add_check_with<I, S>(
        &mut self,
        name: impl Into<String>,
        tags: I,
        timeout: Option<Duration>,
        probe: Arc<dyn HealthProbe>,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut descriptor = CheckDescriptor::new(name, probe).with_tags(tags);
        if let Some(timeout) = timeout {
            descriptor = descriptor.with_timeout(timeout);
        }
        self.register(descriptor)?;
        Ok(self)
    }

    /// Snapshot of all checks in registration order
    pub fn list(&self) -> Vec<Arc<CheckDescriptor>> {
        self.checks.clone()
    }

    /// Look up a check by name
    pub fn get(&self, name: &str) -> Option<&Arc<CheckDescriptor>> {
        self.checks.iter().find(|d| d.name() == name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|d| d.name())
    }

    /// Timeout given to checks registered without one
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Number of registered checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether no checks are registered
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probe::probe_fn;
    use crate::health::types::ProbeReport;

    fn healthy() -> Arc<dyn HealthProbe> {
        probe_fn(|| Ok(ProbeReport::healthy("ok")))
    }

    #[test]
    fn test_register_and_list_in_order() {
        let mut registry = CheckRegistry::new();
        registry.add_check("Database", healthy()).unwrap();
        registry.add_check("Disk Space", healthy()).unwrap();
        registry.add_check("CPU Usage", healthy()).unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["Database", "Disk Space", "CPU Usage"]);
        assert_eq!(registry.list().len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected_and_registry_unchanged() {
        let mut registry = CheckRegistry::new();
        registry
            .add_check_with("Database", ["database"], Some(Duration::from_secs(5)), healthy())
            .unwrap();

        let result = registry.add_check_with("Database", ["other"], None, healthy());
        assert!(matches!(result, Err(Error::DuplicateCheckName(ref n)) if n == "Database"));

        assert_eq!(registry.len(), 1);
        let kept = registry.get("Database").unwrap();
        assert!(kept.has_tag("database"));
        assert!(!kept.has_tag("other"));
        assert_eq!(kept.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_timeout_applied() {
        let mut registry = CheckRegistry::with_default_timeout(Duration::from_secs(7));
        registry.add_check("Memory Usage", healthy()).unwrap();
        registry
            .register(CheckDescriptor::new("Disk Space", healthy()).with_timeout(Duration::from_secs(2)))
            .unwrap();

        assert_eq!(registry.get("Memory Usage").unwrap().timeout(), Duration::from_secs(7));
        assert_eq!(registry.get("Disk Space").unwrap().timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_descriptors_rejected() {
        let mut registry = CheckRegistry::new();
        assert!(matches!(
            registry.add_check("  ", healthy()),
            Err(Error::InvalidCheck(_))
        ));
        assert!(matches!(
            registry.register(CheckDescriptor::new("Zero", healthy()).with_timeout(Duration::ZERO)),
            Err(Error::InvalidCheck(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent_of_later_registration() {
        let mut registry = CheckRegistry::new();
        registry.add_check("a", healthy()).unwrap();
        let snapshot = registry.list();
        registry.add_check("b", healthy()).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
