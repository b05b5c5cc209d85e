//! Normalisation of extracted slot values.
//!
//! Cities are trimmed and whitespace-collapsed. Date-like values carrying an
//! explicit year are rewritten as ISO `YYYY-MM-DD` (day-first for numeric
//! forms), keeping a trailing clock time. Anything else (`9:30`,
//! `tomorrow`) passes through trimmed.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use courier_core::ShipmentRecord;
use regex::Regex;

/// Formats tried in order once weekday names and ordinals are stripped.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d %B %Y",
    "%B %d %Y",
];

const MIN_YEAR: i32 = 1900;

static TRAILING_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)[\s,]+(?:at\s+)?(\d{1,2}[:.][0-5]\d(?:\s*[ap]m)?|\d{1,2}\s*[ap]m)$")
        .expect("Invalid trailing time regex")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thu|fri|sat|sun)\b",
    )
    .expect("Invalid weekday regex")
});

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("Invalid ordinal regex"));

static FILLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:the|of|on)\b").expect("Invalid filler regex"));

static SEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("Invalid sept regex"));

/// Trim a city name; blank input is treated as absent.
pub fn clean_city(raw: Option<&str>) -> Option<String> {
    let collapsed = raw?.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Trim a date/time value and normalise full dates to ISO.
pub fn clean_date_or_time(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = parse_date(raw) {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    if let Some(caps) = TRAILING_TIME.captures(raw) {
        if let Some(date) = parse_date(&caps[1]) {
            return Some(format!("{} {}", date.format("%Y-%m-%d"), &caps[2]));
        }
    }

    Some(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Clean every field of a candidate record.
pub fn clean_record(record: &ShipmentRecord) -> ShipmentRecord {
    ShipmentRecord {
        origin_city: clean_city(record.origin_city.as_deref()),
        destination_city: clean_city(record.destination_city.as_deref()),
        ship_date_or_time: clean_date_or_time(record.ship_date_or_time.as_deref()),
    }
}

/// Parse a calendar date with an explicit year.
///
/// Accepts ISO, day-first numerics and written forms such as
/// `Saturday 7th Feb 2026` or `February 7, 2026`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = WEEKDAY.replace_all(raw, " ");
    let text = ORDINAL.replace_all(&text, "$1");
    let text = FILLER.replace_all(&text, " ");
    let text = SEPT.replace_all(&text, "sep");
    let text = text
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
        // "7/2/26" would otherwise parse as year 7 under "%Y/%m/%d".
        .find(|d| d.year() >= MIN_YEAR)
}
