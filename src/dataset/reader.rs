//! Discovery and loading of CSV datasets

use crate::records::{CleanedRecord, RawRow};
use crate::{DatasetError, DatasetResult};
use glob::{glob_with, MatchOptions, Pattern};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Recursively finds files whose name contains `search` (case-insensitive)
///
/// Results are sorted by path so the concatenation order is stable between
/// runs. Symlinked directories are not descended into; unreadable entries are
/// skipped with a warning.
pub fn discover_files(directory: &Path, search: &str) -> DatasetResult<Vec<PathBuf>> {
    fs::metadata(directory).map_err(|source| DatasetError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let pattern = format!(
        "{}/**/*{}*",
        Pattern::escape(&directory.display().to_string()),
        Pattern::escape(search)
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let paths = glob_with(&pattern, options).map_err(|source| DatasetError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", e.path().display(), e.error());
                continue;
            }
        };
        if path.is_file() && !under_symlinked_dir(directory, &path) {
            found.push(path);
        }
    }
    found.sort();
    found.dedup();

    Ok(found)
}

/// True if any directory between `root` and `path` is a symlink
fn under_symlinked_dir(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .into_iter()
        .flat_map(Path::ancestors)
        .filter(|dir| !dir.as_os_str().is_empty())
        .any(|dir| {
            fs::symlink_metadata(root.join(dir))
                .map(|meta| meta.file_type().is_symlink())
                .unwrap_or(false)
        })
}

/// Loads one raw dataset
///
/// # Errors
///
/// * `EmptyData` - the file has no header row
/// * `Parse` - a row could not be read (ragged row, invalid UTF-8, ...)
pub fn load_raw_file(path: &Path) -> DatasetResult<Vec<RawRow>> {
    read_rows(path)
}

/// Loads a cleaned dataset written by the cleaning pipeline
///
/// `Year` is derived from the publication date for files written with the
/// core schema.
pub fn load_cleaned_file(path: &Path) -> DatasetResult<Vec<CleanedRecord>> {
    let rows: Vec<CleanedRecord> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(CleanedRecord::with_derived_year)
        .collect())
}

/// Discovers and concatenates every matching raw dataset
///
/// Rows keep the order of discovery, then the order within each file.
pub fn load_raw_batches(directory: &Path, search: &str) -> DatasetResult<Vec<RawRow>> {
    let files = discover_files(directory, search)?;
    if files.is_empty() {
        return Err(DatasetError::NoInputFiles {
            directory: directory.to_path_buf(),
            pattern: search.to_string(),
        });
    }

    let mut combined = Vec::new();
    for file in &files {
        let rows = load_raw_file(file)?;
        tracing::info!("Loaded {} rows from {}", rows.len(), file.display());
        combined.extend(rows);
    }

    tracing::info!(
        "Combined {} rows from {} files",
        combined.len(),
        files.len()
    );
    Ok(combined)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> DatasetResult<Vec<T>> {
    let parse_error = |source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(parse_error)?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DatasetError::EmptyData {
            path: path.to_path_buf(),
        });
    }

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(parse_error)
}
