//! Storage module for the cleaned book dataset
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Loading the cleaned dataset into the `books` table
//! - Load tracking
//! - The analytical queries behind the reports

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::{SqliteStorage, IN_MEMORY};
pub use traits::{Storage, StorageError, StorageResult};

use crate::dataset::load_cleaned_file;
use crate::HarvestError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file, or `:memory:`
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Loads a cleaned dataset file, replacing whatever the table held before
///
/// The load is recorded in `load_runs` together with the config hash.
///
/// # Returns
///
/// The number of books inserted
pub fn load_dataset<S: Storage>(
    storage: &mut S,
    source: &Path,
    config_hash: &str,
) -> Result<usize, HarvestError> {
    let records = load_cleaned_file(source)?;
    tracing::info!("Read {} cleaned rows from {}", records.len(), source.display());

    let inserted = storage.replace_books(&records)?;
    let run_id = storage.record_load_run(&source.display().to_string(), config_hash, inserted)?;
    tracing::debug!("Recorded load run {}", run_id);

    Ok(inserted)
}

/// Represents a completed load
#[derive(Debug, Clone)]
pub struct LoadRunRecord {
    pub id: i64,
    pub loaded_at: String,
    pub source_path: String,
    pub config_hash: String,
    pub row_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatedBook {
    pub title: String,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLength {
    pub title: String,
    pub categories: String,
    pub page_count: i64,
}

/// Best book of one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTopRated {
    pub categories: String,
    pub title: String,
    pub top_rated: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublisherSummary {
    pub publisher: String,
    pub num_books: i64,
    pub average_page_count: Option<f64>,
    pub highest_rated: Option<f64>,
}

/// A book's rating next to its year's mean
#[derive(Debug, Clone, PartialEq)]
pub struct YearComparison {
    pub title: String,
    pub year: Option<i32>,
    pub average_rating: f64,
    pub year_avg_rating: Option<f64>,
}
