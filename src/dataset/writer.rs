//! CSV writers for raw and cleaned datasets

use crate::config::{OutputConfig, OutputSchema};
use crate::records::{CleanedRecord, RawRecord, RAW_COLUMNS};
use crate::{DatasetError, DatasetResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes fetch results to numbered files that never overwrite each other
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    directory: PathBuf,
    base_filename: String,
    extension: String,
}

impl DatasetWriter {
    pub fn new(
        directory: impl Into<PathBuf>,
        base_filename: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            base_filename: base_filename.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            &config.raw_directory,
            &config.raw_base_filename,
            &config.raw_extension,
        )
    }

    /// Writes `records` to `{directory}/{base}{n}{ext}` and returns the path
    ///
    /// The directory is created if needed, and `n` is one past the largest
    /// suffix already present.
    pub fn write(&self, records: &[RawRecord]) -> DatasetResult<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|source| DatasetError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let filename = next_filename(&self.directory, &self.base_filename, &self.extension)?;
        let path = self.directory.join(filename);

        // header written up front so an empty run still yields a loadable file
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|source| DatasetError::Write {
                path: path.clone(),
                source,
            })?;
        writer
            .write_record(RAW_COLUMNS)
            .map_err(|source| DatasetError::Write {
                path: path.clone(),
                source,
            })?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|source| DatasetError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        writer.flush().map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Data saved to {} ({} records)", path.display(), records.len());
        Ok(path)
    }
}

/// Picks the next free `{base}{n}{ext}` name in `directory`
///
/// Only names whose middle part is all digits count. With no matches the
/// numbering starts at 1.
pub fn next_filename(directory: &Path, base_filename: &str, extension: &str) -> DatasetResult<String> {
    let entries = fs::read_dir(directory).map_err(|source| DatasetError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut max_index: u64 = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let index = name
            .strip_prefix(base_filename)
            .and_then(|rest| rest.strip_suffix(extension))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u64>().ok());
        if let Some(index) = index {
            max_index = max_index.max(index);
        }
    }

    Ok(format!("{}{}{}", base_filename, max_index + 1, extension))
}

/// Writes the cleaned dataset to a fixed path, creating parent directories
pub fn write_cleaned(
    path: &Path,
    records: &[CleanedRecord],
    schema: OutputSchema,
) -> DatasetResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DatasetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_error = |source| DatasetError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_error)?;
    writer
        .write_record(CleanedRecord::header(schema))
        .map_err(write_error)?;
    for record in records {
        writer
            .write_record(record.fields(schema))
            .map_err(write_error)?;
    }
    writer.flush().map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Cleaned dataset saved to {} ({} rows)", path.display(), records.len());
    Ok(())
}
