//! Calendar date parsing for archive records.
//!
//! Letter dates arrive as free text from spreadsheets and transcriptions.
//! Parsing never fails: anything unreadable lands on [`SENTINEL_DATE`] so
//! downstream graph code always has a real date to work with.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Date used when a record's date cannot be read (1900-01-01).
pub const SENTINEL_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("year-month regex"));
static ANY_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("year regex"));

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_exact(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Parse a date, returning `None` when no rule matches.
pub fn try_parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = parse_exact(raw) {
        return Some(date);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }

    // A trailing time of day ("1888-05-01 10:00") is dropped
    if let Some(date) = raw
        .split_whitespace()
        .next()
        .filter(|head| head.len() < raw.len())
        .and_then(parse_exact)
    {
        return Some(date);
    }

    if let Some(caps) = YEAR_MONTH.captures(raw) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
            return Some(date);
        }
    }

    // Last resort: the first four-digit run is taken as a year.
    let year: i32 = ANY_YEAR.find(raw)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Parse a date, falling back to [`SENTINEL_DATE`].
pub fn parse_letter_date(raw: &str) -> NaiveDate {
    try_parse_date(raw).unwrap_or_else(|| {
        log::debug!("Unreadable date {raw:?}, using sentinel {SENTINEL_DATE}");
        SENTINEL_DATE
    })
}
