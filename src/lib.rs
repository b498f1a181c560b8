//! Book Harvester: fetch, clean and analyse book metadata
//!
//! This crate pulls volume metadata from the Google Books API, writes it to raw
//! CSV files, cleans those files into a single consistent dataset, and loads the
//! result into SQLite for a set of analytical reports.

pub mod cleaning;
pub mod config;
pub mod dataset;
pub mod harvest;
pub mod output;
pub mod records;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Book Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Cleaning error: {0}")]
    Clean(#[from] CleanError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("API key not found. Set the {0} environment variable (or add it to .env)")]
    MissingApiKey(String),
}

/// Errors raised while reading or writing CSV datasets
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No data: {path}")]
    EmptyData { path: PathBuf },

    #[error("Parsing error in {path}: {source}")]
    Parse { path: PathBuf, source: csv::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },

    #[error("No files matching '{pattern}' under {directory}")]
    NoInputFiles { directory: PathBuf, pattern: String },

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// Errors raised by the cleaning pipeline
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Cannot convert {column} value '{value}' on row {row} to {target}")]
    TypeConversion {
        row: usize,
        column: &'static str,
        value: String,
        target: &'static str,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Result type alias for Book Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for dataset I/O
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// Result type alias for the cleaning pipeline
pub type CleanResult<T> = std::result::Result<T, CleanError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{CleanedRecord, RawRecord, RawRow};
