// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing, formatting and lesson arithmetic.

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

/// Naive formats accepted in addition to RFC3339. Interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a client-supplied timestamp.
///
/// Accepts full RFC3339 (any offset, normalized to UTC) as well as the
/// offset-less `YYYY-MM-DDTHH:MM[:SS]` form the calendar widgets send.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// End of a lesson starting at `start` and lasting `duration_minutes`.
pub fn lesson_end(start: DateTime<Utc>, duration_minutes: u32) -> DateTime<Utc> {
    start + Duration::minutes(i64::from(duration_minutes))
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
