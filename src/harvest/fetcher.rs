//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests to the volumes endpoint, including:
//! - Building the HTTP client with timeouts and a user agent
//! - Building the paginated request URL
//! - Classifying responses into a [`PageOutcome`]

use crate::config::ApiConfig;
use crate::harvest::parser::{Volume, VolumesPage};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of fetching one page of search results
#[derive(Debug)]
pub enum PageOutcome {
    /// The page held at least one volume
    Items(Vec<Volume>),

    /// HTTP 200 without items: this query has nothing further
    Exhausted,

    /// HTTP 429
    RateLimited,

    /// Any other non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request never produced a response (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },

    /// HTTP 200 whose body was not a volumes page
    DecodeError {
        /// Error description
        error: String,
    },
}

/// The volumes search endpoint plus the credentials and page size to use
#[derive(Debug, Clone)]
pub struct VolumesEndpoint {
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl VolumesEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, page_size: u32) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_size,
        }
    }

    /// Builds the endpoint described by the `[api]` section
    pub fn from_config(config: &ApiConfig, api_key: impl Into<String>) -> Self {
        Self::new(config.base_url.clone(), api_key, config.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// URL for one page: `?q=..&startIndex=..&maxResults=..&key=..`
    pub fn request_url(&self, query: &str, offset: u32) -> Result<Url, url::ParseError> {
        let offset = offset.to_string();
        let page_size = self.page_size.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("q", query),
                ("startIndex", offset.as_str()),
                ("maxResults", page_size.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use book_harvester::config::ApiConfig;
/// use book_harvester::harvest::build_http_client;
///
/// let client = build_http_client(&ApiConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page of search results
///
/// # Response handling
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 200 with items | `Items` |
/// | HTTP 200, `items` absent or empty | `Exhausted` |
/// | HTTP 200, body not a volumes page | `DecodeError` |
/// | HTTP 429 | `RateLimited` |
/// | Any other status | `HttpError` |
/// | No response | `NetworkError` |
///
/// Nothing is retried here; the pagination driver decides what to do next.
pub async fn fetch_page(client: &Client, url: &Url) -> PageOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return PageOutcome::NetworkError { error };
        }
    };

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return PageOutcome::RateLimited;
    }

    if status != StatusCode::OK {
        return PageOutcome::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.json::<VolumesPage>().await {
        Ok(page) => match page.items {
            Some(items) if !items.is_empty() => PageOutcome::Items(items),
            _ => PageOutcome::Exhausted,
        },
        Err(e) => PageOutcome::DecodeError {
            error: e.to_string(),
        },
    }
}
