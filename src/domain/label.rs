//! Tile label text.
//!
//! Format: `{WEEKDAY} {MON} {D}, {YYYY} AT {HH}:{MM}:{SS} {AM|PM}`,
//! e.g. `MONDAY JAN 6, 2025 AT 03:04:05 PM`.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

const LABEL_FORMAT: &str = "%A %b %-d, %Y at %I:%M:%S %p";

/// Format an instant in whatever zone it carries.
pub fn format_label<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(LABEL_FORMAT).to_string().to_uppercase()
}

/// Label for a wall-clock timestamp (ms since epoch) in the host's local zone.
///
/// Falls back to UTC when the local zone cannot place the instant.
/// Returns `None` only for timestamps chrono cannot represent at all.
pub fn label_for_timestamp_ms(ms: f64) -> Option<String> {
    if !ms.is_finite() {
        return None;
    }
    let ms = ms as i64;
    match Local.timestamp_millis_opt(ms).earliest() {
        Some(at) => Some(format_label(&at)),
        None => Utc.timestamp_millis_opt(ms).single().map(|at| format_label(&at)),
    }
}
