use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses a timestamp as written by the capture process. The store keeps
/// ISO-8601 text; both RFC 3339 and the timezone-less SQLite datetime forms
/// occur in practice.
pub fn parse_store_datetime(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(anyhow!("invalid store timestamp '{value}'"))
}
