//! Individual cleaning steps
//!
//! Each step takes the working set by value and returns the next one, so the
//! pipeline reads top to bottom and every step can be tested on its own.

use crate::records::{CleanedRecord, RawRow};
use crate::{CleanError, CleanResult};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// A complete row after numeric coercion; the date is still text
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub title: String,
    pub authors: String,
    pub publisher: String,
    pub published_date: String,
    pub isbn: String,
    pub page_count: i64,
    pub categories: String,
    pub average_rating: f64,
    pub ratings_count: i64,
    pub language: String,
}

fn full_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid regex"))
}

fn year_only_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").expect("valid regex"))
}

fn parseable_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{2})(?:-(\d{2})(?:[T ].*)?)?$").expect("valid regex")
    })
}

/// Removes every row with at least one missing cell
pub fn drop_incomplete(rows: Vec<RawRow>) -> Vec<RawRow> {
    rows.into_iter().filter(RawRow::is_complete).collect()
}

/// Converts complete rows to typed rows
///
/// PageCount and RatingsCount become integers (integral floats such as
/// `"300.0"` are accepted, other floats truncate), AverageRating becomes a
/// float, and every `".0"` is removed from the ISBN.
///
/// # Errors
///
/// `TypeConversion` for the first non-numeric value, or for a row that still
/// has a missing cell. `row` is the 1-based position in `rows`.
pub fn coerce_types(rows: Vec<RawRow>) -> CleanResult<Vec<TypedRow>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| coerce_row(index + 1, row))
        .collect()
}

fn coerce_row(row_number: usize, row: RawRow) -> CleanResult<TypedRow> {
    let RawRow {
        title,
        authors,
        publisher,
        published_date,
        isbn,
        page_count,
        categories,
        average_rating,
        ratings_count,
        language,
    } = row;

    let text = |column: &'static str, value: Option<String>| {
        value.ok_or_else(|| CleanError::TypeConversion {
            row: row_number,
            column,
            value: String::new(),
            target: "text",
        })
    };

    Ok(TypedRow {
        title: text("Title", title)?,
        authors: text("Authors", authors)?,
        publisher: text("Publisher", publisher)?,
        published_date: text("PublishedDate", published_date)?,
        isbn: text("ISBN", isbn)?.replace(".0", ""),
        page_count: to_integer(row_number, "PageCount", page_count.as_deref())?,
        categories: text("Categories", categories)?,
        average_rating: to_float(row_number, "AverageRating", average_rating.as_deref())?,
        ratings_count: to_integer(row_number, "RatingsCount", ratings_count.as_deref())?,
        language: text("Language", language)?,
    })
}

fn to_integer(row: usize, column: &'static str, value: Option<&str>) -> CleanResult<i64> {
    value
        .and_then(parse_integer)
        .ok_or_else(|| CleanError::TypeConversion {
            row,
            column,
            value: value.unwrap_or_default().to_string(),
            target: "integer",
        })
}

fn to_float(row: usize, column: &'static str, value: Option<&str>) -> CleanResult<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| CleanError::TypeConversion {
            row,
            column,
            value: value.unwrap_or_default().to_string(),
            target: "float",
        })
}

/// Reads an integer, accepting float spellings such as `"300.0"`
pub fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(integer) = value.parse::<i64>() {
        return Some(integer);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
        .map(|f| f.trunc() as i64)
}

/// Drops books with a PageCount of zero
pub fn filter_zero_page_count(rows: Vec<TypedRow>) -> Vec<TypedRow> {
    rows.into_iter().filter(|row| row.page_count != 0).collect()
}

/// Parses a column of publication dates
///
/// Unless every value already contains a `YYYY-MM-DD` date, bare years are
/// expanded to January 1st first. Values that still cannot be read become
/// `None`; this step never fails.
pub fn normalize_dates<S: AsRef<str>>(values: &[S]) -> Vec<Option<NaiveDate>> {
    let all_full_dates = values
        .iter()
        .all(|value| full_date_pattern().is_match(value.as_ref()));

    values
        .iter()
        .map(|value| {
            let value = value.as_ref().trim();
            if !all_full_dates && year_only_pattern().is_match(value) {
                parse_date(&format!("{}-01-01", value))
            } else {
                parse_date(value)
            }
        })
        .collect()
}

/// Reads `YYYY-MM-DD` (optionally followed by a time) or `YYYY-MM`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let captures = parseable_date_pattern().captures(value.trim())?;
    let year = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    let day = match captures.get(3) {
        Some(day) => day.as_str().parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Pairs typed rows with their parsed dates
///
/// Derived columns are left at their defaults until [`derive_features`] runs.
pub fn attach_dates(rows: Vec<TypedRow>, dates: Vec<Option<NaiveDate>>) -> Vec<CleanedRecord> {
    rows.into_iter()
        .zip(dates)
        .map(|(row, published_date)| CleanedRecord {
            title: row.title,
            authors: row.authors,
            publisher: row.publisher,
            published_date,
            isbn: row.isbn,
            page_count: row.page_count,
            categories: row.categories,
            average_rating: row.average_rating,
            ratings_count: row.ratings_count,
            language: row.language,
            title_word_count: 0,
            year: None,
        })
        .collect()
}

/// Keeps the first row for every key, preserving order
pub fn dedupe_by_key<T, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(key(row).to_string()))
        .collect()
}

/// Keeps the first record for every ISBN
pub fn dedupe_by_isbn(records: Vec<CleanedRecord>) -> Vec<CleanedRecord> {
    dedupe_by_key(records, |record| record.isbn.as_str())
}

/// Number of whitespace-separated tokens
pub fn title_word_count(title: &str) -> u32 {
    title.split_whitespace().count() as u32
}

/// Fills TitleWordCount and Year
pub fn derive_features(records: &mut [CleanedRecord]) {
    for record in records {
        record.title_word_count = title_word_count(&record.title);
        record.year = record.published_date.map(|date| date.year());
    }
}
