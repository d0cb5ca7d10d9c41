//! Report serializer: the JSON contract of `GET /health`
//!
//! ```json
//! {
//!   "status": "Healthy",
//!   "totalDuration": "00:00:00.0123456",
//!   "errors": [
//!     { "key": "Database", "status": "Healthy",
//!       "description": "Database is reachable", "duration": "00:00:00.0041234" }
//!   ]
//! }
//! ```
//!
//! `errors` lists every check whatever its status. Durations use the
//! `[d.]hh:mm:ss[.fffffff]` time span notation with 100 ns resolution.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{CheckOutcome, HealthReport, HealthStatus};
use crate::core::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportPayload {
    status: HealthStatus,
    #[serde(with = "timespan")]
    total_duration: Duration,
    errors: Vec<EntryPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryPayload {
    key: String,
    status: HealthStatus,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(with = "timespan")]
    duration: Duration,
}

impl From<&HealthReport> for ReportPayload {
    fn from(report: &HealthReport) -> Self {
        Self {
            status: report.status(),
            total_duration: report.total_duration(),
            errors: report
                .entries()
                .iter()
                .map(|(key, outcome)| EntryPayload {
                    key: key.clone(),
                    status: outcome.status,
                    description: outcome.description.clone(),
                    error: outcome.error.clone(),
                    duration: outcome.duration,
                })
                .collect(),
        }
    }
}

/// Render a report as a JSON string
pub fn to_json(report: &HealthReport) -> Result<String> {
    Ok(serde_json::to_string(&ReportPayload::from(report))?)
}

/// Render a report as JSON bytes, ready for a response body
pub fn to_json_bytes(report: &HealthReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ReportPayload::from(report))?)
}

/// Decode a JSON payload back into a report
///
/// Rejects payloads with duplicate keys or whose overall status does not
/// follow from their entries.
pub fn from_json(payload: &str) -> Result<HealthReport> {
    let decoded: ReportPayload = serde_json::from_str(payload)?;

    let mut entries = BTreeMap::new();
    for entry in decoded.errors {
        let outcome = CheckOutcome {
            status: entry.status,
            description: entry.description,
            error: entry.error,
            duration: entry.duration,
        };
        if entries.insert(entry.key.clone(), outcome).is_some() {
            return Err(Error::Serialization(serde_json::Error::custom(format!(
                "duplicate check key '{}'",
                entry.key
            ))));
        }
    }

    let report = HealthReport::new(entries, decoded.total_duration);
    if report.status() != decoded.status {
        return Err(Error::Serialization(serde_json::Error::custom(format!(
            "overall status {} does not match entries ({})",
            decoded.status,
            report.status()
        ))));
    }
    Ok(report)
}

/// Serde adapter for `[d.]hh:mm:ss[.fffffff]` durations
pub mod timespan {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Write;
    use std::time::Duration;

    const TICK_NANOS: u32 = 100;
    const TICKS_PER_SECOND: u32 = 10_000_000;

    /// Format a duration, truncated to 100 ns ticks
    pub fn format(d: Duration) -> String {
        let total = d.as_secs();
        let (days, hours, minutes, seconds) = (
            total / 86_400,
            (total % 86_400) / 3_600,
            (total % 3_600) / 60,
            total % 60,
        );
        let ticks = d.subsec_nanos() / TICK_NANOS;

        let mut out = String::with_capacity(24);
        if days > 0 {
            let _ = write!(out, "{days}.");
        }
        let _ = write!(out, "{hours:02}:{minutes:02}:{seconds:02}");
        if ticks > 0 {
            let _ = write!(out, ".{ticks:07}");
        }
        out
    }

    /// Parse a time span string
    pub fn parse(s: &str) -> std::result::Result<Duration, String> {
        let invalid = || format!("invalid time span '{s}'");

        let mut parts = s.split(':');
        let (head, minutes, tail) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(m), Some(t), None) => (h, m, t),
            _ => return Err(invalid()),
        };

        let (days, hours) = match head.split_once('.') {
            Some((d, h)) => (number(d).ok_or_else(invalid)?, number(h).ok_or_else(invalid)?),
            None => (0, number(head).ok_or_else(invalid)?),
        };
        let minutes = number(minutes).ok_or_else(invalid)?;
        let (seconds, ticks) = match tail.split_once('.') {
            Some((secs, frac)) => {
                if frac.is_empty() || frac.len() > 7 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let ticks: u32 = format!("{frac:0<7}").parse().map_err(|_| invalid())?;
                (number(secs).ok_or_else(invalid)?, ticks)
            }
            None => (number(tail).ok_or_else(invalid)?, 0),
        };

        if hours >= 24 || minutes >= 60 || seconds >= 60 || ticks >= TICKS_PER_SECOND {
            return Err(invalid());
        }

        let secs = days
            .checked_mul(86_400)
            .and_then(|s| s.checked_add(hours * 3_600 + minutes * 60 + seconds))
            .ok_or_else(invalid)?;
        Ok(Duration::new(secs, ticks * TICK_NANOS))
    }

    fn number(s: &str) -> Option<u64> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    }

    /// Serialize a duration as a time span string
    pub fn serialize<S>(d: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(*d))
    }

    /// Deserialize a duration from a time span string
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::types::ProbeReport;

    fn sample_report() -> HealthReport {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Database".to_string(),
            CheckOutcome::completed(
                ProbeReport::healthy("Database is reachable"),
                Duration::from_nanos(4_123_400),
            ),
        );
        entries.insert(
            "External API".to_string(),
            CheckOutcome::failed("External API", "dns error", Duration::from_millis(12)),
        );
        entries.insert(
            "Disk Space".to_string(),
            CheckOutcome::timed_out("Disk Space", Duration::from_secs(5)),
        );
        HealthReport::new(entries, Duration::from_millis(5_002))
    }

    #[test]
    fn test_timespan_format() {
        assert_eq!(timespan::format(Duration::ZERO), "00:00:00");
        assert_eq!(timespan::format(Duration::from_secs(5)), "00:00:05");
        assert_eq!(timespan::format(Duration::from_nanos(12_345_600)), "00:00:00.0123456");
        assert_eq!(timespan::format(Duration::from_secs(90_061)), "1.01:01:01");
        // sub-tick precision is truncated
        assert_eq!(timespan::format(Duration::from_nanos(150)), "00:00:00.0000001");
    }

    #[test]
    fn test_timespan_parse() {
        assert_eq!(timespan::parse("00:00:05"), Ok(Duration::from_secs(5)));
        assert_eq!(timespan::parse("00:00:00.5"), Ok(Duration::from_millis(500)));
        assert_eq!(timespan::parse("2.00:00:00"), Ok(Duration::from_secs(172_800)));
        assert!(timespan::parse("00:61:00").is_err());
        assert!(timespan::parse("5s").is_err());
        assert!(timespan::parse("00:00:00.12345678").is_err());
        assert!(timespan::parse("-00:00:01").is_err());
    }

    #[test]
    fn test_timespan_parse_rejects_overflow() {
        assert!(timespan::parse("9999999999999999.00:00:00").is_err());
        assert!(timespan::parse("213503982334601.23:59:59").is_err());
    }

    #[test]
    fn test_oversized_total_duration_is_an_error() {
        let payload =
            r#"{"status":"Healthy","totalDuration":"9999999999999999.00:00:00","errors":[]}"#;
        assert!(matches!(from_json(payload), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "Unhealthy");
        assert_eq!(value["totalDuration"], "00:00:05.0020000");
        let errors = value["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 3);

        let db = errors.iter().find(|e| e["key"] == "Database").unwrap();
        assert_eq!(db["status"], "Healthy");
        assert_eq!(db["description"], "Database is reachable");
        assert_eq!(db["duration"], "00:00:00.0041234");
        assert!(db.get("error").is_none());

        let api = errors.iter().find(|e| e["key"] == "External API").unwrap();
        assert_eq!(api["description"], "External API failed");
        assert_eq!(api["error"], "dns error");
    }

    #[test]
    fn test_round_trip_recovers_report() {
        let report = sample_report();
        let decoded = from_json(&to_json(&report).unwrap()).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_bytes_match_string() {
        let report = sample_report();
        assert_eq!(
            to_json_bytes(&report).unwrap(),
            to_json(&report).unwrap().into_bytes()
        );
    }

    #[test]
    fn test_inconsistent_status_rejected() {
        let payload = r#"{
            "status": "Healthy",
            "totalDuration": "00:00:01",
            "errors": [
                { "key": "a", "status": "Unhealthy", "description": "a failed", "duration": "00:00:01" }
            ]
        }"#;
        assert!(matches!(from_json(payload), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let payload = r#"{
            "status": "Healthy",
            "totalDuration": "00:00:01",
            "errors": [
                { "key": "a", "status": "Healthy", "description": "ok", "duration": "00:00:00" },
                { "key": "a", "status": "Healthy", "description": "ok", "duration": "00:00:00" }
            ]
        }"#;
        assert!(matches!(from_json(payload), Err(Error::Serialization(_))));
    }
}
