//! Cleaning pipeline for raw datasets
//!
//! Turns the concatenated raw files into one typed, deduplicated dataset:
//!
//! 1. Discover and load raw files
//! 2. Audit missing values
//! 3. Drop incomplete rows
//! 4. Coerce numeric columns and tidy the ISBN
//! 5. Drop zero-page books
//! 6. Normalize publication dates
//! 7. Deduplicate by ISBN, keeping the first row
//! 8. Derive TitleWordCount and Year

mod audit;
mod steps;

pub use audit::{audit_missing, MissingValueReport};
pub use steps::{
    attach_dates, coerce_types, dedupe_by_isbn, dedupe_by_key, derive_features, drop_incomplete,
    filter_zero_page_count, normalize_dates, parse_date, parse_integer, title_word_count,
    TypedRow,
};

use crate::config::CleaningConfig;
use crate::dataset::{load_raw_batches, write_cleaned};
use crate::records::{CleanedRecord, RawRow};
use crate::CleanResult;
use std::path::Path;

/// Row counts after each stage of a cleaning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningReport {
    pub loaded_rows: usize,
    pub complete_rows: usize,
    pub nonzero_page_rows: usize,
    pub unparsed_dates: usize,
    pub unique_rows: usize,
    pub missing: MissingValueReport,
}

/// Output of a cleaning run
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub records: Vec<CleanedRecord>,
    pub report: CleaningReport,
}

/// Applies steps 2 to 8 to an already concatenated working set
pub fn clean_rows(rows: Vec<RawRow>) -> CleanResult<CleanedDataset> {
    let loaded_rows = rows.len();
    let missing = audit_missing(&rows);

    let rows = drop_incomplete(rows);
    let complete_rows = rows.len();
    tracing::debug!("{} of {} rows are complete", complete_rows, loaded_rows);

    let rows = filter_zero_page_count(coerce_types(rows)?);
    let nonzero_page_rows = rows.len();

    let raw_dates: Vec<&str> = rows.iter().map(|r| r.published_date.as_str()).collect();
    let dates = normalize_dates(&raw_dates);
    let unparsed_dates = dates.iter().filter(|d| d.is_none()).count();
    if unparsed_dates > 0 {
        tracing::warn!("{} publication dates could not be parsed", unparsed_dates);
    }

    let mut records = dedupe_by_isbn(attach_dates(rows, dates));
    derive_features(&mut records);
    let unique_rows = records.len();

    tracing::info!(
        "Cleaning kept {} of {} rows ({} complete, {} with pages)",
        unique_rows,
        loaded_rows,
        complete_rows,
        nonzero_page_rows
    );

    Ok(CleanedDataset {
        records,
        report: CleaningReport {
            loaded_rows,
            complete_rows,
            nonzero_page_rows,
            unparsed_dates,
            unique_rows,
            missing,
        },
    })
}

/// Runs a complete cleaning operation
///
/// Loads every raw file under `cleaning.input-directory` whose name contains
/// `cleaning.search-string`, cleans the rows, and writes the result to
/// `cleaning.output-path` in the configured schema.
pub fn run_cleaning(config: &CleaningConfig) -> CleanResult<CleanedDataset> {
    let rows = load_raw_batches(Path::new(&config.input_directory), &config.search_string)?;
    let dataset = clean_rows(rows)?;
    write_cleaned(Path::new(&config.output_path), &dataset.records, config.schema)?;
    Ok(dataset)
}
