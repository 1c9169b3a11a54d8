//! Project slugs.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::id::base36_encode;
use crate::error::Result;

/// Slug used when a name contains nothing slug-worthy.
pub const FALLBACK_SLUG: &str = "project";

static NON_SLUG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9]+").unwrap_or_else(|_| unreachable!("static pattern compiles"))
});

/// Lowercase, collapse runs of anything outside `[a-z0-9]` into `-`, trim dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let dashed = NON_SLUG.replace_all(&lower, "-");
    let trimmed = dashed.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `slug-<base36 epoch millis>`, bumping the millisecond value while `taken` says so.
///
/// # Errors
///
/// Returns the first error `taken` reports.
pub fn disambiguate<F>(slug: &str, now: DateTime<Utc>, taken: F) -> Result<String>
where
    F: Fn(&str) -> Result<bool>,
{
    let mut millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    loop {
        let candidate = format!("{slug}-{}", base36_encode(millis));
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        millis += 1;
    }
}
