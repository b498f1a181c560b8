/// Cleaned record definitions
use crate::config::OutputSchema;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Date format used wherever a cleaned date is written as text
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A fully typed book row, ready for loading into the database
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CleanedRecord {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Authors")]
    pub authors: String,

    #[serde(rename = "Publisher")]
    pub publisher: String,

    /// `None` when the source value could not be read as a date
    #[serde(rename = "PublishedDate", deserialize_with = "deserialize_date")]
    pub published_date: Option<NaiveDate>,

    #[serde(rename = "ISBN")]
    pub isbn: String,

    #[serde(rename = "PageCount")]
    pub page_count: i64,

    #[serde(rename = "Categories")]
    pub categories: String,

    #[serde(rename = "AverageRating")]
    pub average_rating: f64,

    #[serde(rename = "RatingsCount")]
    pub ratings_count: i64,

    #[serde(rename = "Language")]
    pub language: String,

    /// Number of whitespace-separated tokens in the title
    #[serde(rename = "TitleWordCount")]
    pub title_word_count: u32,

    /// Publication year; absent from files written with the core schema
    #[serde(rename = "Year", default)]
    pub year: Option<i32>,
}

impl CleanedRecord {
    /// Column names written for the given schema
    pub fn header(schema: OutputSchema) -> Vec<&'static str> {
        let mut columns = vec![
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
            "TitleWordCount",
        ];
        if schema == OutputSchema::Analytics {
            columns.push("Year");
        }
        columns
    }

    /// Cell values written for the given schema, aligned with [`Self::header`]
    pub fn fields(&self, schema: OutputSchema) -> Vec<String> {
        let mut fields = vec![
            self.title.clone(),
            self.authors.clone(),
            self.publisher.clone(),
            self.published_date_text().unwrap_or_default(),
            self.isbn.clone(),
            self.page_count.to_string(),
            self.categories.clone(),
            self.average_rating.to_string(),
            self.ratings_count.to_string(),
            self.language.clone(),
            self.title_word_count.to_string(),
        ];
        if schema == OutputSchema::Analytics {
            fields.push(self.year.map(|y| y.to_string()).unwrap_or_default());
        }
        fields
    }

    /// The publication date as `YYYY-MM-DD`
    pub fn published_date_text(&self) -> Option<String> {
        self.published_date
            .map(|d| d.format(DATE_FORMAT).to_string())
    }

    /// Fills `year` from the publication date when the column was not present
    pub fn with_derived_year(mut self) -> Self {
        if self.year.is_none() {
            self.year = self.published_date.map(|d| d.year());
        }
        self
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell.and_then(|value| NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()))
}
