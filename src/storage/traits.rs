//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::records::CleanedRecord;
use crate::storage::{
    CategoryLength, CategoryTopRated, LoadRunRecord, PublisherSummary, RatedBook, YearComparison,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Insert failed on row {row} ({isbn}): {source}")]
    Insert {
        row: usize,
        isbn: String,
        source: rusqlite::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines every database operation the loader and the reports need.
pub trait Storage {
    // ===== Loading =====

    /// Inserts all records in a single transaction
    ///
    /// Nothing is inserted if any row fails.
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn insert_books(&mut self, records: &[CleanedRecord]) -> StorageResult<usize>;

    /// Swaps the whole table for `records` in a single transaction
    ///
    /// On failure the previously loaded books are kept.
    fn replace_books(&mut self, records: &[CleanedRecord]) -> StorageResult<usize>;

    /// Records a completed load
    ///
    /// # Arguments
    ///
    /// * `source_path` - The cleaned dataset that was loaded
    /// * `config_hash` - Hash of the configuration file
    /// * `row_count` - Number of rows inserted
    fn record_load_run(
        &mut self,
        source_path: &str,
        config_hash: &str,
        row_count: usize,
    ) -> StorageResult<i64>;

    /// Gets the most recent load
    fn get_latest_load_run(&self) -> StorageResult<Option<LoadRunRecord>>;

    // ===== Statistics =====

    /// Counts book rows
    fn count_books(&self) -> StorageResult<u64>;

    // ===== Reports =====

    /// Books rated above the mean rating, best first
    fn higher_than_average_rating(&self, limit: u32) -> StorageResult<Vec<RatedBook>>;

    /// Books longer than the mean page count of their category, longest first
    fn longer_than_category_average(&self, limit: u32) -> StorageResult<Vec<CategoryLength>>;

    /// Distinct authors with a book longer than the overall mean page count
    fn authors_with_longer_than_average_books(&self, limit: u32) -> StorageResult<Vec<String>>;

    /// Highest-rated book of each category among books with more than `min_ratings` ratings
    fn top_rated_per_category(&self, min_ratings: i64) -> StorageResult<Vec<CategoryTopRated>>;

    /// Per-publisher totals for publishers with at least `min_books` books
    fn publisher_summary(&self, min_books: i64) -> StorageResult<Vec<PublisherSummary>>;

    /// Each book's rating next to the mean rating of its publication year
    fn year_rating_comparison(&self, limit: u32) -> StorageResult<Vec<YearComparison>>;
}
