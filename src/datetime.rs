//! Date/time utilities for Agora.
//!
//! Timestamps are stored by SQLite as UTC text (`YYYY-MM-DD HH:MM:SS`).

use chrono::{DateTime, NaiveDateTime, Utc};

/// Format string used by SQLite's `datetime('now')`.
const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a stored timestamp (SQLite or RFC3339 form) as UTC.
pub fn parse_stored(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, SQLITE_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(datetime_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// Returns the input unchanged when it is not in the SQLite format.
pub fn to_rfc3339(datetime_str: &str) -> String {
    match NaiveDateTime::parse_from_str(datetime_str, SQLITE_FORMAT) {
        Ok(naive) => naive.and_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        Err(_) => datetime_str.to_string(),
    }
}

/// Describe the time elapsed between `then` and `now` ("3 days ago").
///
/// Picks the largest unit with a non-zero count; anything under a second
/// (or in the future) is "just now".
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let days = diff.num_days();
    let seconds = diff.num_seconds();

    let periods = [
        (days / 365, "year", "years"),
        (days / 30, "month", "months"),
        (days / 7, "week", "weeks"),
        (days, "day", "days"),
        (seconds / 3600, "hour", "hours"),
        (seconds / 60, "minute", "minutes"),
        (seconds, "second", "seconds"),
    ];

    for (count, singular, plural) in periods {
        if count > 0 {
            let unit = if count == 1 { singular } else { plural };
            return format!("{count} {unit} ago");
        }
    }

    "just now".to_string()
}

/// `time_since` for a stored timestamp, relative to the current time.
pub fn time_since_stored(datetime_str: &str) -> Option<String> {
    parse_stored(datetime_str).map(|then| time_since(then, Utc::now()))
}
