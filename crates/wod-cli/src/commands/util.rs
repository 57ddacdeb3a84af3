//! Shared utilities for CLI commands.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a datetime as local wall-clock time.
///
/// Supports:
/// - ISO 8601 with offset: "2026-10-19T09:00:00+02:00" (converted to local time)
/// - Local: "2026-10-19 09:00", "2026-10-19 09:00:00.000001", "2026-10-19T09:00"
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| {
            format!(
                "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-10-19T09:00:00+02:00) or local time (e.g., '2026-10-19 09:00')"
            )
        })
}

/// Parse a calendar day in `YYYY-MM-DD` form.
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid day: {s}. Use YYYY-MM-DD (e.g., 2026-10-21)"))
}

/// Current local wall-clock time, unless overridden.
pub fn now_or(override_now: Option<NaiveDateTime>) -> NaiveDateTime {
    override_now.unwrap_or_else(|| Local::now().naive_local())
}
