//! Dataset module for CSV files on disk
//!
//! This module handles:
//! - Writing fetch results to numbered raw files that never overwrite
//! - Discovering and concatenating raw files for cleaning
//! - Writing and reading the cleaned dataset

mod reader;
mod writer;

pub use reader::{discover_files, load_cleaned_file, load_raw_batches, load_raw_file};
pub use writer::{next_filename, write_cleaned, DatasetWriter};
