//! Date normalization for scraped race listings.
//!
//! Listing sites publish dates in whatever shape their templates emit:
//! `29-05-2026`, `1/6/26`, `29 May 26`, `3 Dic. 25`, sometimes ISO. All
//! ambiguous numeric forms are read day-first, which is how the source
//! sites write them.

use chrono::NaiveDate;
use thiserror::Error;

/// Why a date string could not be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("empty date text")]
    Empty,

    #[error("unrecognized month `{0}`")]
    UnknownMonth(String),

    #[error("unrecognized date format `{0}`")]
    Unrecognized(String),

    #[error("no such calendar date: day {day}, month {month}, year {year}")]
    OutOfRange { day: u32, month: u32, year: i32 },
}

/// Month lookup by the first three letters, Spanish and English mixed
/// because the sources mix them.
const MONTHS: &[(&str, u32)] = &[
    ("ene", 1),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("abr", 4),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dic", 12),
    ("dec", 12),
];

/// Normalize one scraped date string to a calendar date.
///
/// Accepted shapes, all three-part: day-first numeric with `-`, `/`, `.` or
/// whitespace separators, day + month name (Spanish or English, matched on
/// the first three letters) + year, and year-first ISO. Two-digit years are
/// always read as 20xx.
pub fn normalize_date(text: &str) -> Result<NaiveDate, DateError> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return Err(DateError::Empty);
    }

    let parts: Vec<&str> = cleaned
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | '.'))
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(DateError::Unrecognized(cleaned.to_string()));
    }

    // A four-digit leading segment can only be a year, so the string is ISO
    // ordered. Everything else is day-first.
    let (day_token, month_token, year_token) =
        if parts[0].len() == 4 && parts[0].chars().all(|c| c.is_ascii_digit()) {
            (parts[2], parts[1], parts[0])
        } else {
            (parts[0], parts[1], parts[2])
        };

    let day: u32 = day_token
        .parse()
        .map_err(|_| DateError::Unrecognized(cleaned.to_string()))?;
    let month = parse_month(month_token, cleaned)?;
    let year = parse_year(year_token, cleaned)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::OutOfRange { day, month, year })
}

fn parse_month(token: &str, original: &str) -> Result<u32, DateError> {
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token
            .parse()
            .map_err(|_| DateError::Unrecognized(original.to_string()));
    }

    let key: String = token.to_lowercase().chars().take(3).collect();
    MONTHS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, number)| *number)
        .ok_or_else(|| DateError::UnknownMonth(token.to_string()))
}

fn parse_year(token: &str, original: &str) -> Result<i32, DateError> {
    let value: i32 = token
        .parse()
        .map_err(|_| DateError::Unrecognized(original.to_string()))?;
    match token.len() {
        2 => Ok(2000 + value),
        4 => Ok(value),
        _ => Err(DateError::Unrecognized(original.to_string())),
    }
}
