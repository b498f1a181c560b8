//! Record types flowing through the pipeline
//!
//! # Components
//!
//! - `RawRecord`: one volume as fetched, written to raw CSV files
//! - `RawRow`: one raw CSV row as read back for cleaning, every cell optional
//! - `CleanedRecord`: a typed, deduplicated row ready for loading

mod cleaned;
mod raw;

pub use cleaned::{CleanedRecord, DATE_FORMAT};
pub use raw::{is_missing, RawRecord, RawRow, NA_TOKENS, RAW_COLUMNS, SENTINEL};
