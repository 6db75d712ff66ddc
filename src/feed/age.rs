//! Relative age labels ("45s ago", "in 3d", "2mo ago")
//!
//! Labels are computed once when a feed is loaded and are not refreshed
//! while the browser runs.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

const MINUTE: u64 = 60;
const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;
/// Thirty days; anything at or past this is reported in months
const MONTH: u64 = 2_592_000;

/// Label used when the post time cannot be parsed
pub const UNKNOWN_AGE: &str = "unknown";

/// Parse a feed timestamp.
///
/// Accepts RFC 3339 with `Z` or a numeric offset. A timestamp without any
/// offset is taken to be UTC.
pub fn parse_post_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Age label for a raw post time relative to `now`
pub fn age_label(post_time: &str, now: DateTime<Utc>) -> String {
    match parse_post_time(post_time) {
        Some(posted) => format_age(posted, now),
        None => UNKNOWN_AGE.to_string(),
    }
}

/// Format the distance between `posted` and `now`.
///
/// Whole seconds, floor-divided into the first matching bucket. Future
/// times read "in {n}{unit}", past times "{n}{unit} ago".
pub fn format_age(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - posted;
    let in_future = delta < TimeDelta::zero();
    let seconds = delta.num_seconds().unsigned_abs();

    let magnitude = if seconds < MINUTE {
        format!("{}s", seconds)
    } else if seconds < HOUR {
        format!("{}m", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{}h", seconds / HOUR)
    } else if seconds < MONTH {
        format!("{}d", seconds / DAY)
    } else {
        format!("{}mo", seconds / MONTH)
    };

    if in_future {
        format!("in {}", magnitude)
    } else {
        format!("{} ago", magnitude)
    }
}
