//! Run summaries printed to stdout
//!
//! This module renders what each pipeline stage did: the fetch outcome, the
//! cleaning stage counts with a preview of the data, and the state of the store.

use crate::cleaning::CleanedDataset;
use crate::config::OutputSchema;
use crate::harvest::{HarvestOutcome, StopReason};
use crate::records::CleanedRecord;
use crate::storage::{LoadRunRecord, Storage, StorageResult};

/// Rows shown in the cleaned-data preview
pub const PREVIEW_ROWS: usize = 10;

/// Width of the missing-value bars
const CHART_WIDTH: usize = 40;

/// Contents of the book store
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    pub total_books: u64,
    pub latest_load: Option<LoadRunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_books: storage.count_books()?,
        latest_load: storage.get_latest_load_run()?,
    })
}

/// Prints store statistics
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Book Store ===\n");
    println!("  Books loaded: {}", stats.total_books);
    match &stats.latest_load {
        Some(run) => {
            println!("  Last load: {} ({})", run.loaded_at, run.source_path);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("  No loads recorded"),
    }
}

/// Short description of why a fetch run ended
pub fn describe_stop(reason: StopReason) -> &'static str {
    match reason {
        StopReason::TargetReached => "target reached",
        StopReason::RateLimited => "stopped on rate limit",
        StopReason::Interrupted => "interrupted",
        StopReason::Exhausted => "no more results",
    }
}

pub fn print_harvest_summary(outcome: &HarvestOutcome) {
    println!("=== Fetch Summary ===\n");
    println!("  Books collected: {}", outcome.records.len());
    println!("  Requests sent: {}", outcome.requests);
    println!("  Rate limit responses: {}", outcome.rate_limit_hits);
    println!("  Finished: {}", describe_stop(outcome.stop_reason));
}

/// Renders the stage counts and missing-value chart of a cleaning run
pub fn format_cleaning_summary(dataset: &CleanedDataset) -> String {
    let report = &dataset.report;
    let mut out = String::from("=== Cleaning Summary ===\n\n");

    out.push_str(&report.missing.render_chart(CHART_WIDTH));
    out.push('\n');

    out.push_str(&format!("  Rows loaded: {}\n", report.loaded_rows));
    out.push_str(&format!("  Complete rows: {}\n", report.complete_rows));
    out.push_str(&format!("  Rows with pages: {}\n", report.nonzero_page_rows));
    out.push_str(&format!("  Unparsed dates: {}\n", report.unparsed_dates));
    out.push_str(&format!("  Unique ISBNs: {}\n", report.unique_rows));
    out
}

/// Renders the first rows of a cleaned dataset as a `|`-separated table
pub fn format_preview(records: &[CleanedRecord], schema: OutputSchema) -> String {
    let mut out = CleanedRecord::header(schema).join(" | ");
    out.push('\n');
    for record in records.iter().take(PREVIEW_ROWS) {
        out.push_str(&record.fields(schema).join(" | "));
        out.push('\n');
    }
    out
}

pub fn print_cleaning_summary(dataset: &CleanedDataset, schema: OutputSchema) {
    println!("{}", format_cleaning_summary(dataset));
    print!("{}", format_preview(&dataset.records, schema));
}
