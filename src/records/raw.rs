/// Raw record definitions
///
/// A `RawRecord` is what the fetch loop produces for a single volume; a
/// `RawRow` is the same data read back from a raw CSV file, where any cell
/// may be missing.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder written for any field the API did not supply
pub const SENTINEL: &str = "N/A";

/// Column names of a raw dataset, in file order
pub const RAW_COLUMNS: [&str; 10] = [
    "Title",
    "Authors",
    "Publisher",
    "PublishedDate",
    "ISBN",
    "PageCount",
    "Categories",
    "AverageRating",
    "RatingsCount",
    "Language",
];

/// Cell values treated as missing when reading a raw dataset
pub const NA_TOKENS: [&str; 11] = [
    "", "N/A", "NA", "n/a", "#N/A", "NaN", "nan", "null", "NULL", "None", "<NA>",
];

/// Returns true if a raw cell should be treated as missing
pub fn is_missing(value: &str) -> bool {
    NA_TOKENS.contains(&value.trim())
}

/// One volume as fetched from the API
///
/// Text fields carry [`SENTINEL`] when absent. Numeric fields are `None` when
/// absent and serialize as [`SENTINEL`], so files on disk look the same for
/// every column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    #[serde(rename = "Title")]
    pub title: String,

    /// Authors joined with `", "`
    #[serde(rename = "Authors")]
    pub authors: String,

    #[serde(rename = "Publisher")]
    pub publisher: String,

    /// Exactly as supplied: `2001-05-01`, `2001-05`, `2001` or the sentinel
    #[serde(rename = "PublishedDate")]
    pub published_date: String,

    #[serde(rename = "ISBN")]
    pub isbn: String,

    #[serde(rename = "PageCount", serialize_with = "serialize_or_sentinel")]
    pub page_count: Option<i64>,

    /// Categories joined with `", "`
    #[serde(rename = "Categories")]
    pub categories: String,

    #[serde(rename = "AverageRating", serialize_with = "serialize_or_sentinel")]
    pub average_rating: Option<f64>,

    #[serde(rename = "RatingsCount", serialize_with = "serialize_or_sentinel")]
    pub ratings_count: Option<i64>,

    #[serde(rename = "Language")]
    pub language: String,
}

impl RawRecord {
    /// A record with every field missing
    pub fn empty() -> Self {
        Self {
            title: SENTINEL.to_string(),
            authors: SENTINEL.to_string(),
            publisher: SENTINEL.to_string(),
            published_date: SENTINEL.to_string(),
            isbn: SENTINEL.to_string(),
            page_count: None,
            categories: SENTINEL.to_string(),
            average_rating: None,
            ratings_count: None,
            language: SENTINEL.to_string(),
        }
    }
}

fn serialize_or_sentinel<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(SENTINEL),
    }
}

/// One row of a raw dataset as loaded for cleaning
///
/// Columns absent from the file and cells holding an NA token are `None`.
/// Unknown columns (an index column, for instance) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(rename = "Title", deserialize_with = "deserialize_cell")]
    pub title: Option<String>,

    #[serde(rename = "Authors", deserialize_with = "deserialize_cell")]
    pub authors: Option<String>,

    #[serde(rename = "Publisher", deserialize_with = "deserialize_cell")]
    pub publisher: Option<String>,

    #[serde(rename = "PublishedDate", deserialize_with = "deserialize_cell")]
    pub published_date: Option<String>,

    #[serde(rename = "ISBN", deserialize_with = "deserialize_cell")]
    pub isbn: Option<String>,

    #[serde(rename = "PageCount", deserialize_with = "deserialize_cell")]
    pub page_count: Option<String>,

    #[serde(rename = "Categories", deserialize_with = "deserialize_cell")]
    pub categories: Option<String>,

    #[serde(rename = "AverageRating", deserialize_with = "deserialize_cell")]
    pub average_rating: Option<String>,

    #[serde(rename = "RatingsCount", deserialize_with = "deserialize_cell")]
    pub ratings_count: Option<String>,

    #[serde(rename = "Language", deserialize_with = "deserialize_cell")]
    pub language: Option<String>,
}

impl RawRow {
    /// Cells paired with their column names, in [`RAW_COLUMNS`] order
    pub fn cells(&self) -> [(&'static str, Option<&str>); 10] {
        [
            (RAW_COLUMNS[0], self.title.as_deref()),
            (RAW_COLUMNS[1], self.authors.as_deref()),
            (RAW_COLUMNS[2], self.publisher.as_deref()),
            (RAW_COLUMNS[3], self.published_date.as_deref()),
            (RAW_COLUMNS[4], self.isbn.as_deref()),
            (RAW_COLUMNS[5], self.page_count.as_deref()),
            (RAW_COLUMNS[6], self.categories.as_deref()),
            (RAW_COLUMNS[7], self.average_rating.as_deref()),
            (RAW_COLUMNS[8], self.ratings_count.as_deref()),
            (RAW_COLUMNS[9], self.language.as_deref()),
        ]
    }

    /// Returns true if every column holds a value
    pub fn is_complete(&self) -> bool {
        self.cells().iter().all(|(_, value)| value.is_some())
    }
}

impl From<&RawRecord> for RawRow {
    fn from(record: &RawRecord) -> Self {
        fn text(value: &str) -> Option<String> {
            (!is_missing(value)).then(|| value.to_string())
        }

        Self {
            title: text(&record.title),
            authors: text(&record.authors),
            publisher: text(&record.publisher),
            published_date: text(&record.published_date),
            isbn: text(&record.isbn),
            page_count: record.page_count.map(|v| v.to_string()),
            categories: text(&record.categories),
            average_rating: record.average_rating.map(|v| v.to_string()),
            ratings_count: record.ratings_count.map(|v| v.to_string()),
            language: text(&record.language),
        }
    }
}

fn deserialize_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell.filter(|value| !is_missing(value)))
}
