//! Timestamp storage and display helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Stored form: RFC3339 UTC with microseconds, so text order matches time order.
#[must_use]
pub fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `Jan 5, 2026`.
#[must_use]
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Relative age: `just now`, `5 minutes ago`, `1 hour ago`, `29 days ago`,
/// then the absolute date from 30 days on.
#[must_use]
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        ago(minutes, "minute")
    } else if elapsed.num_hours() < 24 {
        ago(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        ago(elapsed.num_days(), "day")
    } else {
        format_date(ts)
    }
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
