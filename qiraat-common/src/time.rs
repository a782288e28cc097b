//! Timestamp utilities

use chrono::{DateTime, Local, TimeZone, Utc};

/// Display format for history timestamps, e.g. `18/10/2026 14:05:09`
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Human-readable timestamp in the server's local time zone
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    format_timestamp_in(at, &Local)
}

/// Human-readable timestamp in an explicit time zone
pub fn format_timestamp_in<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}
