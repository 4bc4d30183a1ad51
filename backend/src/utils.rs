use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};

pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Start of the "recently published" window ending at `now`.
pub fn search_window_start(now: DateTime<Utc>, window_days: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_days(window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .with_context(|| format!("Search window of {window_days} days is out of range"))
}

/// Unix timestamp of an RFC 3339 publish date, 0 when absent or unparseable.
pub fn parse_iso8601_to_timestamp(date_str: &str) -> i64 {
    date_str
        .parse::<DateTime<Utc>>()
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

/// Splits comma-separated keyword input into trimmed, non-empty, distinct terms (first
/// occurrence wins, case-insensitive).
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !keywords.iter().any(|k| k.eq_ignore_ascii_case(term)) {
            keywords.push(term.to_string());
        }
    }
    keywords
}

/// Distinct values in first-seen order.
pub fn dedup_preserving_order<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}
