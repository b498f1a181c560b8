//! Volume parsing
//!
//! Deserializes the volumes endpoint's JSON and flattens each volume into a
//! [`RawRecord`], substituting the sentinel for anything the API left out.

use crate::records::{RawRecord, SENTINEL};
use serde::Deserialize;

/// Identifier type whose value becomes the record's ISBN
pub const ISBN_13: &str = "ISBN_13";

/// Body of a volumes search response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumesPage {
    pub total_items: Option<u64>,

    /// Absent once the query has no more results
    pub items: Option<Vec<Volume>>,
}

/// One search result
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Volume {
    pub id: Option<String>,
    pub volume_info: Option<VolumeInfo>,
}

/// The bibliographic part of a volume
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub page_count: Option<i64>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<i64>,
    pub language: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

/// Flattens one volume into a raw record
///
/// A volume without `volumeInfo` produces a record of sentinels.
pub fn parse_volume(volume: &Volume) -> RawRecord {
    let Some(info) = volume.volume_info.as_ref() else {
        return RawRecord::empty();
    };

    RawRecord {
        title: text_or_sentinel(info.title.as_deref()),
        authors: join_or_sentinel(info.authors.as_deref()),
        publisher: text_or_sentinel(info.publisher.as_deref()),
        published_date: text_or_sentinel(info.published_date.as_deref()),
        isbn: extract_isbn13(info.industry_identifiers.as_deref()),
        page_count: info.page_count,
        categories: join_or_sentinel(info.categories.as_deref()),
        average_rating: info.average_rating,
        ratings_count: info.ratings_count,
        language: text_or_sentinel(info.language.as_deref()),
    }
}

/// Flattens every volume of a page, in response order
pub fn parse_volumes(volumes: &[Volume]) -> Vec<RawRecord> {
    volumes.iter().map(parse_volume).collect()
}

/// Returns the first ISBN_13 identifier, or the sentinel
pub fn extract_isbn13(identifiers: Option<&[IndustryIdentifier]>) -> String {
    identifiers
        .unwrap_or_default()
        .iter()
        .find(|id| id.kind == ISBN_13)
        .map(|id| id.identifier.clone())
        .unwrap_or_else(|| SENTINEL.to_string())
}

fn text_or_sentinel(value: Option<&str>) -> String {
    value.unwrap_or(SENTINEL).to_string()
}

fn join_or_sentinel(values: Option<&[String]>) -> String {
    match values {
        Some(values) if !values.is_empty() => values.join(", "),
        _ => SENTINEL.to_string(),
    }
}
