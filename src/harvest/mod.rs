//! Harvest module for fetching volumes from the books API
//!
//! This module contains the fetch side of the pipeline, including:
//! - Search term generation
//! - HTTP fetching of result pages
//! - Flattening volumes into raw records
//! - The pagination loop with rate-limit handling

mod coordinator;
mod fetcher;
mod parser;
mod query;

pub use coordinator::{FetchSession, HarvestOutcome, HarvestSettings, Harvester, StopReason};
pub use fetcher::{build_http_client, fetch_page, PageOutcome, VolumesEndpoint};
pub use parser::{
    extract_isbn13, parse_volume, parse_volumes, IndustryIdentifier, Volume, VolumeInfo,
    VolumesPage, ISBN_13,
};
pub use query::QueryGenerator;

use crate::config::Config;
use crate::dataset::DatasetWriter;
use crate::HarvestError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Runs a complete fetch operation
///
/// Builds a [`Harvester`] from the configuration and runs it until the target
/// is reached, the API stops it, or `cancel` fires. The returned outcome holds
/// every record collected, ready to be written.
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `api_key` - Key for the volumes endpoint
/// * `cancel` - Token cancelled on Ctrl-C
pub async fn harvest(
    config: &Config,
    api_key: String,
    cancel: CancellationToken,
) -> Result<HarvestOutcome, HarvestError> {
    let harvester = Harvester::new(config, api_key, cancel)?;
    Ok(harvester.run().await)
}

/// Runs a fetch and saves whatever it collected
///
/// Records are written to a new numbered raw file whatever the stop reason,
/// including interruption and rate limiting. Nothing is written when the run
/// collected no records.
///
/// # Returns
///
/// The outcome and the path of the written file, if any
pub async fn fetch_and_save(
    config: &Config,
    api_key: String,
    cancel: CancellationToken,
) -> Result<(HarvestOutcome, Option<PathBuf>), HarvestError> {
    let outcome = harvest(config, api_key, cancel).await?;

    if outcome.records.is_empty() {
        tracing::warn!("No books were fetched; nothing to save");
        return Ok((outcome, None));
    }

    let path = DatasetWriter::from_config(&config.output).write(&outcome.records)?;
    Ok((outcome, Some(path)))
}
