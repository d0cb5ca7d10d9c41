//! Check descriptors: what to run, under which name, for how long

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::probe::HealthProbe;

/// A registered check. Immutable once handed to the registry.
#[derive(Clone)]
pub struct CheckDescriptor {
    name: String,
    tags: BTreeSet<String>,
    timeout: Option<Duration>,
    probe: Arc<dyn HealthProbe>,
}

impl CheckDescriptor {
    /// New descriptor without tags; the registry supplies the default timeout
    pub fn new(name: impl Into<String>, probe: Arc<dyn HealthProbe>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
            timeout: None,
            probe,
        }
    }

    /// Attach tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set an explicit timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fill in the timeout if none was given
    pub(crate) fn or_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout.get_or_insert(timeout);
        self
    }

    /// Unique check name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Whether the check carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Time the probe is allowed to run
    ///
    /// Registered descriptors always have a timeout; the fallback only
    /// matters for descriptors that were never registered.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(super::registry::DEFAULT_CHECK_TIMEOUT)
    }

    /// The probe
    pub fn probe(&self) -> &Arc<dyn HealthProbe> {
        &self.probe
    }
}

impl fmt::Debug for CheckDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckDescriptor")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
