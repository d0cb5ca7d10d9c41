//! Configuration management for the health aggregator
//!
//! Settings are layered: built-in defaults, then a TOML file, then `HA_*`
//! environment variables. Command line overrides are applied by the binary.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "health-aggregator.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Aggregation engine settings
    pub health: HealthConfig,

    /// Built-in probe settings
    pub checks: ChecksConfig,

    /// Metrics and monitoring
    pub metrics: MetricsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,
}

/// Aggregation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Timeout applied to checks registered without one
    #[serde(with = "duration_str")]
    pub default_timeout: Duration,
}

/// Settings for every built-in probe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Database reachability probe
    pub database: DatabaseCheckConfig,
    /// External HTTP dependency probe
    pub external_api: ExternalApiCheckConfig,
    /// Process memory probe
    pub memory: MemoryCheckConfig,
    /// Process CPU probe
    pub cpu: CpuCheckConfig,
    /// Disk free space probe
    pub disk: DiskCheckConfig,
}

/// Database reachability probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseCheckConfig {
    /// Register the probe
    pub enabled: bool,
    /// Database host and port
    pub address: String,
    /// Check timeout
    #[serde(with = "duration_str")]
    pub timeout: Duration,
    /// Tags attached to the check
    pub tags: Vec<String>,
}

/// External HTTP dependency probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalApiCheckConfig {
    /// Register the probe
    pub enabled: bool,
    /// URL fetched with GET
    pub url: String,
    /// Check timeout, the engine default when unset
    #[serde(with = "duration_str::option", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Tags attached to the check
    pub tags: Vec<String>,
}

/// Process memory probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCheckConfig {
    /// Register the probe
    pub enabled: bool,
    /// Resident memory limit in megabytes
    pub threshold_mb: u64,
    /// Tags attached to the check
    pub tags: Vec<String>,
}

/// Process CPU probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuCheckConfig {
    /// Register the probe
    pub enabled: bool,
    /// Usage limit in percent of total machine capacity
    pub threshold_percent: f64,
    /// Window between the two CPU samples
    #[serde(with = "duration_str")]
    pub sample_interval: Duration,
    /// Tags attached to the check
    pub tags: Vec<String>,
}

/// Disk free space probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskCheckConfig {
    /// Register the probe
    pub enabled: bool,
    /// Any path on the disk to watch
    pub path: PathBuf,
    /// Minimum free space in gigabytes
    pub min_free_gb: u64,
    /// Tags attached to the check
    pub tags: Vec<String>,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics on `/metrics`
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for DatabaseCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: "127.0.0.1:1433".to_string(),
            timeout: Duration::from_secs(5),
            tags: vec!["database".to_string(), "sql".to_string()],
        }
    }
}

impl Default for ExternalApiCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://api.github.com".to_string(),
            timeout: None,
            tags: Vec::new(),
        }
    }
}

impl Default for MemoryCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_mb: 500,
            tags: Vec::new(),
        }
    }
}

impl Default for CpuCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_percent: 80.0,
            sample_interval: Duration::from_millis(250),
            tags: Vec::new(),
        }
    }
}

impl Default for DiskCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("/"),
            min_free_gb: 10,
            tags: Vec::new(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file and environment variables
    ///
    /// The result is not validated; callers apply their own overrides first
    /// and then call [`Config::validate`].
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // A missing default file is fine, a broken one is not
        let default_file = std::path::Path::new(DEFAULT_CONFIG_FILE);
        if default_file.exists() {
            config = Self::from_file(default_file)?;
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        use std::env;

        if let Ok(addr) = env::var("HA_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Ok(timeout) = env::var("HA_DEFAULT_TIMEOUT") {
            self.health.default_timeout = parse_duration(&timeout)
                .map_err(|e| Error::config(format!("Invalid default timeout: {}", e)))?;
        }

        if let Ok(addr) = env::var("HA_DATABASE_ADDR") {
            self.checks.database.address = addr;
        }

        if let Ok(url) = env::var("HA_EXTERNAL_API_URL") {
            self.checks.external_api.url = url;
        }

        if let Ok(path) = env::var("HA_DISK_PATH") {
            self.checks.disk.path = PathBuf::from(path);
        }

        if let Ok(level) = env::var("HA_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = env::var("HA_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.health.default_timeout.is_zero() {
            return Err(Error::config("Default check timeout must be greater than zero"));
        }

        if self.checks.database.timeout.is_zero() {
            return Err(Error::config("Database check timeout must be greater than zero"));
        }

        if matches!(self.checks.external_api.timeout, Some(t) if t.is_zero()) {
            return Err(Error::config("External API check timeout must be greater than zero"));
        }

        let cpu = self.checks.cpu.threshold_percent;
        if !(cpu > 0.0 && cpu <= 100.0) {
            return Err(Error::config("CPU threshold must be within (0, 100]"));
        }

        if self.checks.cpu.sample_interval.is_zero() {
            return Err(Error::config("CPU sample interval must be greater than zero"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => return Err(Error::config("Invalid log format")),
        }

        Ok(())
    }
}

/// Simple duration parser for common formats
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let ms: u64 = ms.parse().map_err(|_| "Invalid milliseconds")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().map_err(|_| "Invalid seconds")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().map_err(|_| "Invalid minutes")?;
        let secs = mins.checked_mul(60).ok_or("Duration out of range")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(hours) = s.strip_suffix('h') {
        let hours: u64 = hours.parse().map_err(|_| "Invalid hours")?;
        let secs = hours.checked_mul(3600).ok_or("Duration out of range")?;
        Ok(Duration::from_secs(secs))
    } else {
        // Try parsing as raw seconds
        let secs: u64 = s.parse().map_err(|_| "Invalid duration format")?;
        Ok(Duration::from_secs(secs))
    }
}

/// Render a duration in the shortest exact unit understood by [`parse_duration`]
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms % 1000 != 0 {
        format!("{}ms", ms)
    } else if d.as_secs() % 3600 == 0 && d.as_secs() > 0 {
        format!("{}h", d.as_secs() / 3600)
    } else if d.as_secs() % 60 == 0 && d.as_secs() > 0 {
        format!("{}m", d.as_secs() / 60)
    } else {
        format!("{}s", d.as_secs())
    }
}

/// Serde adapter storing durations as strings like `"250ms"` or `"5s"`
pub mod duration_str {
    use super::{format_duration, parse_duration};
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;
    use std::time::Duration;

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration string like '30s' or '5m'")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            parse_duration(value).map_err(E::custom)
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration must not be negative"))
        }
    }

    /// Serialize a duration as a string
    pub fn serialize<S>(d: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*d))
    }

    /// Deserialize a duration from a string or a number of seconds
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }

    /// Same adapter for optional durations
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super")] Duration);

        /// Serialize an optional duration as a string
        pub fn serialize<S>(
            d: &Option<Duration>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match d {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional duration
        pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(d)| d))
        }
    }
}
