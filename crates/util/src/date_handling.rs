//! # Date Handling Utilities
//!
//! Items carry timestamps in the compact 17 character wiki format
//! `YYYYMMDDHHMMSSmmm` (UTC, millisecond precision). This module detects and
//! parses that format and renders it for result hints.

use chrono::{DateTime, NaiveDate, Utc};

/// Length of a compact wiki timestamp.
pub const WIKI_DATE_LENGTH: usize = 17;

/// Parses a compact wiki timestamp.
///
/// Only strings of exactly 17 ASCII digits describing a valid calendar date
/// and time are accepted; everything else yields `None`.
///
/// # Arguments
/// * `value` - The candidate timestamp, e.g. `20240131093000123`
///
/// # Returns
/// The parsed UTC date-time, or `None` when the value is not a wiki timestamp
///
/// # Example
/// ```rust
/// use notepal_util::date_handling::parse_wiki_date;
///
/// let parsed = parse_wiki_date("20240131093000123").unwrap();
/// assert_eq!(parsed.to_rfc3339(), "2024-01-31T09:30:00.123+00:00");
///
/// assert!(parse_wiki_date("2024013109300012").is_none());
/// assert!(parse_wiki_date("20241331093000123").is_none());
/// assert!(parse_wiki_date("Some ordinary title").is_none());
/// ```
pub fn parse_wiki_date(value: &str) -> Option<DateTime<Utc>> {
    if value.len() != WIKI_DATE_LENGTH || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let number = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();

    let year = value[0..4].parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(4..6)?, number(6..8)?)?;
    let time = date.and_hms_milli_opt(number(8..10)?, number(10..12)?, number(12..14)?, number(14..17)?)?;
    Some(time.and_utc())
}

/// Formats a parsed timestamp for display in a result hint.
///
/// # Example
/// ```rust
/// use notepal_util::date_handling::{format_wiki_date, parse_wiki_date};
///
/// let parsed = parse_wiki_date("20231105174501000").unwrap();
/// assert_eq!(format_wiki_date(&parsed), "2023-11-05 17:45:01 UTC");
/// ```
pub fn format_wiki_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Convenience wrapper returning the display form of a timestamp-looking string.
pub fn wiki_date_hint(value: &str) -> Option<String> {
    parse_wiki_date(value).map(|parsed| format_wiki_date(&parsed))
}
