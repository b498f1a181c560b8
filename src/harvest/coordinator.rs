//! Harvest coordinator - the pagination loop
//!
//! This module drives the fetch run:
//! - Picking a search term and paging through its results
//! - Accumulating parsed records into the session
//! - Applying the configured rate-limit policy
//! - Stopping at the target count, on exhaustion, or on interruption

use crate::config::{Config, RateLimitPolicy};
use crate::harvest::fetcher::{build_http_client, fetch_page, PageOutcome, VolumesEndpoint};
use crate::harvest::parser::parse_volumes;
use crate::harvest::query::QueryGenerator;
use crate::records::RawRecord;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Limits and policies for one fetch run
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Records to collect; the result never exceeds this
    pub target_count: usize,

    /// Offsets at or beyond this are never requested for a query
    pub max_offset: u32,

    pub rate_limit_policy: RateLimitPolicy,

    /// Sleep before retrying the same offset under `WaitAndRetry`
    pub rate_limit_wait: Duration,

    /// Pause after every page that returned items
    pub request_delay: Duration,

    /// Consecutive queries without a single record before giving up
    pub max_empty_queries: u32,
}

impl HarvestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_count: config.fetch.target_count,
            max_offset: config.api.max_offset,
            rate_limit_policy: config.fetch.rate_limit_policy,
            rate_limit_wait: Duration::from_secs(config.fetch.rate_limit_wait_secs),
            request_delay: Duration::from_millis(config.fetch.request_delay_ms),
            max_empty_queries: config.fetch.max_empty_queries,
        }
    }
}

/// Why a fetch run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `target_count` records were collected
    TargetReached,

    /// The API answered 429 under the `StopOnLimit` policy
    RateLimited,

    /// The cancellation token fired
    Interrupted,

    /// Too many consecutive queries produced nothing
    Exhausted,
}

/// In-memory state of a fetch run
#[derive(Debug, Default)]
pub struct FetchSession {
    records: Vec<RawRecord>,
    query: Option<String>,
    offset: u32,
    requests: u64,
    rate_limit_hits: u32,
}

impl FetchSession {
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Current search term, if a query has started
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Next offset to request for the current query
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn rate_limit_hits(&self) -> u32 {
        self.rate_limit_hits
    }

    fn begin_query(&mut self, query: &str) {
        self.query = Some(query.to_string());
        self.offset = 0;
    }
}

/// Result of a fetch run; records are always kept, whatever the reason
#[derive(Debug)]
pub struct HarvestOutcome {
    pub records: Vec<RawRecord>,
    pub stop_reason: StopReason,
    pub requests: u64,
    pub rate_limit_hits: u32,
}

/// How a single query ended
enum QueryEnd {
    /// Move on to a new search term
    NextQuery { added: usize },
    /// Stop the whole run
    Stop(StopReason),
}

/// Main fetch loop structure
pub struct Harvester {
    client: Client,
    endpoint: VolumesEndpoint,
    queries: QueryGenerator,
    settings: HarvestSettings,
    cancel: CancellationToken,
    session: FetchSession,
}

impl Harvester {
    /// Creates a harvester from the configuration and a resolved API key
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration
    /// * `api_key` - The key appended to every request
    /// * `cancel` - Token that ends the run early, keeping what was fetched
    pub fn new(
        config: &Config,
        api_key: String,
        cancel: CancellationToken,
    ) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.api)?;
        Ok(Self::with_parts(
            client,
            VolumesEndpoint::from_config(&config.api, api_key),
            QueryGenerator::from_config(&config.fetch),
            HarvestSettings::from_config(config),
            cancel,
        ))
    }

    /// Creates a harvester from already-built parts
    pub fn with_parts(
        client: Client,
        endpoint: VolumesEndpoint,
        queries: QueryGenerator,
        settings: HarvestSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            endpoint,
            queries,
            settings,
            cancel,
            session: FetchSession::default(),
        }
    }

    pub fn session(&self) -> &FetchSession {
        &self.session
    }

    /// Runs the fetch loop until it stops, returning at most `target_count` records
    pub async fn run(mut self) -> HarvestOutcome {
        tracing::info!(
            "Harvest started: target {} records, policy {:?}",
            self.settings.target_count,
            self.settings.rate_limit_policy
        );

        let mut empty_queries = 0u32;

        let stop_reason = loop {
            if self.session.records.len() >= self.settings.target_count {
                break StopReason::TargetReached;
            }
            if self.cancel.is_cancelled() {
                break StopReason::Interrupted;
            }

            let query = self.queries.next_query();
            match self.harvest_query(&query).await {
                QueryEnd::Stop(reason) => break reason,
                QueryEnd::NextQuery { added: 0 } => {
                    empty_queries += 1;
                    if empty_queries >= self.settings.max_empty_queries {
                        tracing::warn!(
                            "{} consecutive queries returned nothing, giving up",
                            empty_queries
                        );
                        break StopReason::Exhausted;
                    }
                }
                QueryEnd::NextQuery { .. } => empty_queries = 0,
            }
        };

        self.finish(stop_reason)
    }

    /// Pages through one search term
    async fn harvest_query(&mut self, query: &str) -> QueryEnd {
        let before = self.session.records.len();
        self.session.begin_query(query);
        tracing::debug!("Starting query '{}'", query);

        while self.session.offset < self.settings.max_offset {
            let url = match self.endpoint.request_url(query, self.session.offset) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Cannot build request URL: {}", e);
                    break;
                }
            };

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return QueryEnd::Stop(StopReason::Interrupted),
                outcome = fetch_page(&self.client, &url) => outcome,
            };
            self.session.requests += 1;

            match outcome {
                PageOutcome::Items(volumes) => {
                    self.session.records.extend(parse_volumes(&volumes));
                    self.session.offset += self.endpoint.page_size();

                    let total = self.session.records.len();
                    println!("Fetched {} books so far.", total);
                    tracing::info!(
                        "Fetched {} books so far (query '{}', next offset {})",
                        total,
                        query,
                        self.session.offset
                    );

                    if total >= self.settings.target_count {
                        return QueryEnd::Stop(StopReason::TargetReached);
                    }
                    if !self.pause(self.settings.request_delay).await {
                        return QueryEnd::Stop(StopReason::Interrupted);
                    }
                }
                PageOutcome::Exhausted => {
                    tracing::debug!(
                        "Query '{}' exhausted at offset {}",
                        query,
                        self.session.offset
                    );
                    break;
                }
                PageOutcome::RateLimited => {
                    self.session.rate_limit_hits += 1;
                    match self.settings.rate_limit_policy {
                        RateLimitPolicy::StopOnLimit => {
                            tracing::error!("Rate limit hit. Saving fetched data and exiting.");
                            println!("Rate limit exceeded. Saving fetched data...");
                            return QueryEnd::Stop(StopReason::RateLimited);
                        }
                        RateLimitPolicy::WaitAndRetry => {
                            let wait = self.settings.rate_limit_wait;
                            tracing::warn!(
                                "Rate limit hit at offset {}; waiting {:?} before retrying",
                                self.session.offset,
                                wait
                            );
                            println!(
                                "Rate limit exceeded. Waiting for {} seconds before retrying...",
                                wait.as_secs()
                            );
                            if !self.pause(wait).await {
                                return QueryEnd::Stop(StopReason::Interrupted);
                            }
                        }
                    }
                }
                PageOutcome::HttpError { status_code } => {
                    tracing::error!("Failed to fetch data: {}", status_code);
                    println!("Error fetching data: {}", status_code);
                    break;
                }
                PageOutcome::NetworkError { error } => {
                    tracing::error!("Request for query '{}' failed: {}", query, error);
                    break;
                }
                PageOutcome::DecodeError { error } => {
                    tracing::error!("Unreadable response for query '{}': {}", query, error);
                    break;
                }
            }
        }

        QueryEnd::NextQuery {
            added: self.session.records.len() - before,
        }
    }

    /// Sleeps unless cancelled; returns false if the token fired
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn finish(self, stop_reason: StopReason) -> HarvestOutcome {
        let FetchSession {
            mut records,
            requests,
            rate_limit_hits,
            ..
        } = self.session;
        records.truncate(self.settings.target_count);

        tracing::info!(
            "Harvest stopped ({:?}): {} records from {} requests, {} rate-limit responses",
            stop_reason,
            records.len(),
            requests,
            rate_limit_hits
        );

        HarvestOutcome {
            records,
            stop_reason,
            requests,
            rate_limit_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn settings(target_count: usize) -> HarvestSettings {
        HarvestSettings {
            target_count,
            max_offset: 1000,
            rate_limit_policy: RateLimitPolicy::StopOnLimit,
            rate_limit_wait: Duration::from_millis(1),
            request_delay: Duration::ZERO,
            max_empty_queries: 1,
        }
    }

    fn harvester(target_count: usize, cancel: CancellationToken) -> Harvester {
        Harvester::with_parts(
            build_http_client(&ApiConfig::default()).unwrap(),
            VolumesEndpoint::new("http://127.0.0.1:9/volumes", "key", 40),
            QueryGenerator::Topics(vec!["science".to_string()]),
            settings(target_count),
            cancel,
        )
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config::default();
        let settings = HarvestSettings::from_config(&config);
        assert_eq!(settings.target_count, 10_000);
        assert_eq!(settings.max_offset, 1000);
        assert_eq!(settings.rate_limit_wait, Duration::from_secs(60));
        assert_eq!(settings.request_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_finish_truncates_to_target() {
        let mut harvester = harvester(3, CancellationToken::new());
        harvester.session.records = vec![RawRecord::empty(); 5];

        let outcome = harvester.finish(StopReason::TargetReached);
        assert_eq!(outcome.records.len(), 3);
    }

    #[test]
    fn test_begin_query_resets_offset() {
        let mut session = FetchSession::default();
        session.offset = 80;
        session.begin_query("art");
        assert_eq!(session.offset(), 0);
        assert_eq!(session.query(), Some("art"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_interrupted() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = harvester(10, cancel).run().await;
        assert_eq!(outcome.stop_reason, StopReason::Interrupted);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.requests, 0);
    }
}
