use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::InferredType;

/// `YYYY-MM-DD`, optionally followed by `T`/space and a time with optional
/// seconds and fraction, then an optional `Z` or `±HH[:]MM` offset.
pub const DATE_TIME_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d{1,9})?)?)?(?:Z|[+-]\d{2}:?\d{2})?$";

/// Wire format every generated encoder writes dates in.
pub const DATE_TIME_DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

static DATE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_TIME_PATTERN).expect("valid date pattern"));

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The one date predicate: used by type inference and fixture building alike.
pub fn classify_string(s: &str) -> InferredType {
    if DATE_TIME.is_match(s) {
        InferredType::DateTime
    } else {
        InferredType::String
    }
}

/// Lenient parse; offsets are normalized to UTC. Mirrors [`PARSE_DATE_TIME_SRC`].
///
/// Accepts every shape [`classify_string`] accepts, so a classified sample
/// value only fails here when its calendar values are out of range.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    let (naive, offset_seconds) = split_offset(raw);
    let local = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| NaiveDate::parse_from_str(naive, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))?;
    local.checked_sub_signed(TimeDelta::try_seconds(offset_seconds)?)
}

/// Splits a trailing `Z`, `±HH:MM` or `±HHMM` off a date-time, returning the
/// rest and the offset in seconds east of UTC.
fn split_offset(raw: &str) -> (&str, i64) {
    if let Some(naive) = raw.strip_suffix('Z') {
        return (naive, 0);
    }
    let bytes = raw.as_bytes();
    for (width, colon) in [(6, true), (5, false)] {
        // the offset never starts inside the date part
        let Some(start) = bytes.len().checked_sub(width).filter(|start| *start >= 10) else {
            continue;
        };
        let tail = &bytes[start..];
        let sign = match tail[0] {
            b'+' => 1,
            b'-' => -1,
            _ => continue,
        };
        if colon && tail[3] != b':' {
            continue;
        }
        let minutes_at = if colon { 4 } else { 3 };
        let two_digits = |d: &[u8]| {
            d.iter()
                .all(u8::is_ascii_digit)
                .then(|| i64::from(d[0] - b'0') * 10 + i64::from(d[1] - b'0'))
        };
        if let (Some(hours), Some(minutes)) = (two_digits(&tail[1..3]), two_digits(&tail[minutes_at..minutes_at + 2])) {
            return (&raw[..start], sign * (hours * 3600 + minutes * 60));
        }
    }
    (raw, 0)
}

pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_DISPLAY_FORMAT).to_string()
}

/// Runtime twin of [`parse_date_time`], emitted into generated response modules.
pub const PARSE_DATE_TIME_SRC: &str = r#"fn parse_date_time(raw: &str) -> Option<chrono::NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    let (naive, offset_seconds) = split_offset(raw);
    let local = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| chrono::NaiveDate::parse_from_str(naive, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))?;
    local.checked_sub_signed(chrono::TimeDelta::try_seconds(offset_seconds)?)
}

fn split_offset(raw: &str) -> (&str, i64) {
    if let Some(naive) = raw.strip_suffix('Z') {
        return (naive, 0);
    }
    let bytes = raw.as_bytes();
    for (width, colon) in [(6, true), (5, false)] {
        let Some(start) = bytes.len().checked_sub(width).filter(|start| *start >= 10) else {
            continue;
        };
        let tail = &bytes[start..];
        let sign = match tail[0] {
            b'+' => 1,
            b'-' => -1,
            _ => continue,
        };
        if colon && tail[3] != b':' {
            continue;
        }
        let minutes_at = if colon { 4 } else { 3 };
        let two_digits = |d: &[u8]| {
            d.iter()
                .all(u8::is_ascii_digit)
                .then(|| i64::from(d[0] - b'0') * 10 + i64::from(d[1] - b'0'))
        };
        if let (Some(hours), Some(minutes)) = (two_digits(&tail[1..3]), two_digits(&tail[minutes_at..minutes_at + 2])) {
            return (&raw[..start], sign * (hours * 3600 + minutes * 60));
        }
    }
    (raw, 0)
}
"#;

/// Runtime twin of [`format_date_time`].
pub const FORMAT_DATE_TIME_SRC: &str = r#"fn format_date_time(value: &chrono::NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
"#;

/// Rust expression of type `NaiveDateTime` for a sample date, if it parses.
/// Only used in generated test code, where the literal is known to be valid.
pub fn date_time_literal(raw: &str) -> Option<String> {
    parse_date_time(raw)
        .map(|dt| format!("{:?}.parse::<chrono::NaiveDateTime>().unwrap()", format_date_time(&dt)))
}
