use serde::Deserialize;

/// Main configuration structure for Book Harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub cleaning: CleaningConfig,
    pub database: DatabaseConfig,
}

/// Books API endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Volumes endpoint, without query string
    pub base_url: String,

    /// Name of the environment variable holding the API key
    pub key_env: String,

    /// Results requested per page (the API caps this at 40)
    pub page_size: u32,

    /// Highest `startIndex` the API serves for a single query
    pub max_offset: u32,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            key_env: "GOOGLE_BOOKS_API_KEY".to_string(),
            page_size: 40,
            max_offset: 1000,
            timeout_secs: 30,
            user_agent: format!("book-harvester/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// How search terms are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryPolicy {
    /// A single random lowercase letter
    RandomLetter,
    /// A random entry from `fetch.topics`
    Topics,
}

/// What the fetch loop does when the API answers HTTP 429
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RateLimitPolicy {
    /// Log the event and return what was fetched so far
    #[serde(rename = "stop")]
    StopOnLimit,
    /// Sleep for `rate-limit-wait-secs`, then retry the same offset
    #[serde(rename = "wait")]
    WaitAndRetry,
}

/// Fetch loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Number of records to collect before stopping
    pub target_count: usize,

    pub query_policy: QueryPolicy,

    /// Topic rotation used by the `topics` policy
    pub topics: Vec<String>,

    pub rate_limit_policy: RateLimitPolicy,

    /// Sleep before retrying after a 429 (seconds)
    pub rate_limit_wait_secs: u64,

    /// Pause after each successful page (milliseconds)
    pub request_delay_ms: u64,

    /// Consecutive fruitless queries tolerated before giving up
    pub max_empty_queries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            target_count: 10_000,
            query_policy: QueryPolicy::RandomLetter,
            topics: [
                "science",
                "history",
                "fiction",
                "technology",
                "biography",
                "art",
                "self-help",
                "adventure",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            rate_limit_policy: RateLimitPolicy::StopOnLimit,
            rate_limit_wait_secs: 60,
            request_delay_ms: 1000,
            max_empty_queries: 50,
        }
    }
}

/// Raw dataset and log output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving raw CSV files
    pub raw_directory: String,

    /// File name prefix, followed by an increasing integer
    pub raw_base_filename: String,

    /// File name suffix, including the dot
    pub raw_extension: String,

    /// Path of the structured log file
    pub log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_directory: "data/raw".to_string(),
            raw_base_filename: "random_books_data_".to_string(),
            raw_extension: ".csv".to_string(),
            log_path: "book_harvester.log".to_string(),
        }
    }
}

/// Columns written to the cleaned dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputSchema {
    /// The ten fetched fields plus TitleWordCount
    Core,
    /// Core plus the publication Year
    Analytics,
}

/// Cleaning pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CleaningConfig {
    /// Directory scanned recursively for raw files
    pub input_directory: String,

    /// Case-insensitive substring a raw file name must contain
    pub search_string: String,

    /// Destination of the cleaned dataset
    pub output_path: String,

    pub schema: OutputSchema,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            input_directory: "data/raw".to_string(),
            search_string: "random_books".to_string(),
            output_path: "data/processed/combined_books.csv".to_string(),
            schema: OutputSchema::Analytics,
        }
    }
}

/// SQLite configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, or `:memory:`
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "books.db".to_string(),
        }
    }
}
