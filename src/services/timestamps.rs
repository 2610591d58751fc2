//! Timestamp conversions between epoch milliseconds and the text forms found
//! in CSV backups and transfer envelopes.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Parses epoch milliseconds, RFC 3339, or `YYYY-MM-DD HH:MM:SS` (UTC).
/// Returns `None` for blank or unrecognised text.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return (millis >= 0).then_some(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Converts a Netscape `add_date` attribute (epoch seconds) to milliseconds.
pub fn parse_epoch_seconds(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| *secs > 0)
        .and_then(|secs| secs.checked_mul(1000))
}

/// Formats epoch milliseconds as RFC 3339 (UTC, millisecond precision).
pub fn format_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::new(),
    }
}
