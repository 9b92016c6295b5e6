//! Timestamp helpers shared by repositories and request parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp read back from SQLite
///
/// Rows are written as RFC 3339; `CURRENT_TIMESTAMP` style values are tolerated.
pub fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

/// Fixed-width UTC form so stored timestamps compare correctly as text
pub fn format_db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn db_now() -> String {
    format_db_timestamp(Utc::now())
}

pub fn parse_db_timestamp_opt(ts: Option<&str>) -> Option<DateTime<Utc>> {
    ts.map(parse_db_timestamp)
}

pub fn parse_db_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

pub fn format_db_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a user supplied date-time
///
/// Accepts RFC 3339 and the naive forms produced by HTML `datetime-local`
/// inputs; naive values are taken as UTC.
pub fn parse_datetime_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
}
