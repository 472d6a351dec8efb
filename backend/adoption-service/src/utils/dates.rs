/// `YYYYMMDD` dates as used by the animal protection open data API
use chrono::{Duration, NaiveDate};

use crate::error::{AppError, Result};

const FORMAT: &str = "%Y%m%d";

/// Listing window used when the caller does not bound the search
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

pub fn parse_yyyymmdd(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!(
            "invalid date '{}', expected YYYYMMDD",
            raw
        )));
    }

    NaiveDate::parse_from_str(raw, FORMAT)
        .map_err(|_| AppError::BadRequest(format!("invalid date '{}', expected YYYYMMDD", raw)))
}

pub fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format(FORMAT).to_string()
}

/// Resolve the `bgnde`/`endde` pair into a concrete range.
///
/// A missing end defaults to `today`, a missing start to thirty days before
/// the end. A start after the end is rejected.
pub fn resolve_range(
    begin: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = match end.filter(|s| !s.trim().is_empty()) {
        Some(raw) => parse_yyyymmdd(raw)?,
        None => today,
    };
    let begin = match begin.filter(|s| !s.trim().is_empty()) {
        Some(raw) => parse_yyyymmdd(raw)?,
        None => end - Duration::days(DEFAULT_WINDOW_DAYS),
    };

    if begin > end {
        return Err(AppError::BadRequest(format!(
            "bgnde ({}) must not be after endde ({})",
            format_yyyymmdd(begin),
            format_yyyymmdd(end)
        )));
    }

    Ok((begin, end))
}
