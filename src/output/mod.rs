//! Output module for printing run summaries and reports
//!
//! This module handles:
//! - Printing fetch and cleaning summaries
//! - Running the analytical queries and printing their results
//! - Reporting what the book store holds

mod reports;
pub mod stats;

pub use reports::{
    build_reports, print_reports, ReportSection, MIN_PUBLISHER_BOOKS, MIN_RATINGS_FOR_TOP_RATED,
    RULE_WIDTH,
};
pub use stats::{
    load_statistics, print_cleaning_summary, print_harvest_summary, print_statistics,
    StoreStatistics,
};

use crate::storage::{Storage, StorageResult};

/// Prints the store statistics followed by every report
///
/// # Returns
///
/// The sections that were printed
pub fn run_reports(storage: &dyn Storage) -> StorageResult<Vec<ReportSection>> {
    let stats = load_statistics(storage)?;
    print_statistics(&stats);

    if stats.total_books == 0 {
        tracing::warn!("The book store is empty; run `load` first");
    }

    let sections = build_reports(storage)?;
    print_reports(&sections);
    Ok(sections)
}
