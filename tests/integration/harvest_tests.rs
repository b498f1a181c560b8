//! Integration tests for the fetch loop
//!
//! These tests use wiremock to stand in for the volumes endpoint and drive
//! the pagination loop end-to-end.

use book_harvester::config::{
    ApiConfig, Config, FetchConfig, OutputConfig, QueryPolicy, RateLimitPolicy,
};
use book_harvester::dataset::load_raw_file;
use book_harvester::harvest::{
    build_http_client, fetch_and_save, harvest, HarvestSettings, Harvester, QueryGenerator,
    StopReason, VolumesEndpoint,
};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VOLUMES_PATH: &str = "/books/v1/volumes";

/// Builds a page of `count` volumes whose titles start at `first`
fn page(first: usize, count: usize) -> Value {
    let items: Vec<Value> = (first..first + count)
        .map(|n| {
            json!({
                "id": format!("vol{}", n),
                "volumeInfo": {
                    "title": format!("Book {}", n),
                    "authors": ["Author One", "Author Two"],
                    "publisher": "Test Press",
                    "publishedDate": "2001-05-01",
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": format!("10-{}", n)},
                        {"type": "ISBN_13", "identifier": format!("13-{}", n)}
                    ],
                    "pageCount": 100 + n,
                    "categories": ["Fiction"],
                    "averageRating": 4.0,
                    "ratingsCount": 10,
                    "language": "en"
                }
            })
        })
        .collect();

    json!({ "kind": "books#volumes", "totalItems": 1000, "items": items })
}

fn empty_page() -> Value {
    json!({ "kind": "books#volumes", "totalItems": 0 })
}

fn settings(target_count: usize, policy: RateLimitPolicy) -> HarvestSettings {
    HarvestSettings {
        target_count,
        max_offset: 1000,
        rate_limit_policy: policy,
        rate_limit_wait: Duration::from_millis(10),
        request_delay: Duration::ZERO,
        max_empty_queries: 3,
    }
}

fn harvester(server: &MockServer, settings: HarvestSettings, cancel: CancellationToken) -> Harvester {
    Harvester::with_parts(
        build_http_client(&ApiConfig::default()).expect("client"),
        VolumesEndpoint::new(format!("{}{}", server.uri(), VOLUMES_PATH), "test-key", 3),
        QueryGenerator::Topics(vec!["fiction".to_string()]),
        settings,
        cancel,
    )
}

async fn start_indexes(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|request| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == "startIndex")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        })
        .collect()
}

#[tokio::test]
async fn test_stops_at_target_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 3)))
        .mount(&server)
        .await;

    let outcome = harvester(
        &server,
        settings(5, RateLimitPolicy::StopOnLimit),
        CancellationToken::new(),
    )
    .run()
    .await;

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.requests, 2);
    assert_eq!(start_indexes(&server).await, vec!["0", "3"]);
}

#[tokio::test]
async fn test_records_are_flattened() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(7, 1)))
        .mount(&server)
        .await;

    let outcome = harvester(
        &server,
        settings(1, RateLimitPolicy::StopOnLimit),
        CancellationToken::new(),
    )
    .run()
    .await;

    let record = &outcome.records[0];
    assert_eq!(record.title, "Book 7");
    assert_eq!(record.authors, "Author One, Author Two");
    assert_eq!(record.isbn, "13-7");
    assert_eq!(record.page_count, Some(107));
    assert_eq!(record.categories, "Fiction");
}

#[tokio::test]
async fn test_rate_limit_stop_keeps_partial_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("startIndex", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 2)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("startIndex", "3"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let outcome = harvester(
        &server,
        settings(100, RateLimitPolicy::StopOnLimit),
        CancellationToken::new(),
    )
    .run()
    .await;

    assert_eq!(outcome.stop_reason, StopReason::RateLimited);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.rate_limit_hits, 1);
    assert_eq!(outcome.requests, 2);
}

#[tokio::test]
async fn test_rate_limit_wait_retries_same_offset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 3)))
        .mount(&server)
        .await;

    let outcome = harvester(
        &server,
        settings(3, RateLimitPolicy::WaitAndRetry),
        CancellationToken::new(),
    )
    .run()
    .await;

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.rate_limit_hits, 1);
    assert_eq!(start_indexes(&server).await, vec!["0", "0"]);
}

#[tokio::test]
async fn test_cancel_during_rate_limit_wait_returns_partial_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("startIndex", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 2)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("startIndex", "3"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let mut settings = settings(100, RateLimitPolicy::WaitAndRetry);
    settings.rate_limit_wait = Duration::from_secs(60);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        harvester(&server, settings, cancel).run(),
    )
    .await
    .expect("cancellation should end the wait");

    assert_eq!(outcome.stop_reason, StopReason::Interrupted);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.rate_limit_hits, 1);
}

#[tokio::test]
async fn test_server_error_moves_to_new_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 3)))
        .mount(&server)
        .await;

    let outcome = harvester(
        &server,
        settings(3, RateLimitPolicy::StopOnLimit),
        CancellationToken::new(),
    )
    .run()
    .await;

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.records.len(), 3);
    // the failed query is abandoned, so the next one starts again at zero
    assert_eq!(start_indexes(&server).await, vec!["0", "0"]);
}

#[tokio::test]
async fn test_query_without_items_is_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&server)
        .await;

    let outcome = harvester(
        &server,
        settings(10, RateLimitPolicy::StopOnLimit),
        CancellationToken::new(),
    )
    .run()
    .await;

    assert_eq!(outcome.stop_reason, StopReason::Exhausted);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.requests, 3);
}

#[tokio::test]
async fn test_harvest_from_config_sends_key_and_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("key", "secret"))
        .and(query_param("maxResults", "2"))
        .and(query_param("q", "poetry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 2)))
        .mount(&server)
        .await;

    let config = Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.uri(), VOLUMES_PATH),
            page_size: 2,
            ..ApiConfig::default()
        },
        fetch: FetchConfig {
            target_count: 4,
            query_policy: QueryPolicy::Topics,
            topics: vec!["poetry".to_string()],
            request_delay_ms: 0,
            ..FetchConfig::default()
        },
        ..Config::default()
    };

    let outcome = harvest(&config, "secret".to_string(), CancellationToken::new())
        .await
        .expect("harvest");

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(start_indexes(&server).await, vec!["0", "2"]);
}

#[tokio::test]
async fn test_interrupted_fetch_saves_partial_records() {
    let server = MockServer::start().await;
    let raw = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("startIndex", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 2)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .and(query_param("startIndex", "2"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let config = Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.uri(), VOLUMES_PATH),
            page_size: 2,
            ..ApiConfig::default()
        },
        fetch: FetchConfig {
            target_count: 100,
            query_policy: QueryPolicy::Topics,
            topics: vec!["fiction".to_string()],
            rate_limit_policy: RateLimitPolicy::WaitAndRetry,
            rate_limit_wait_secs: 60,
            request_delay_ms: 0,
            ..FetchConfig::default()
        },
        output: OutputConfig {
            raw_directory: raw.path().display().to_string(),
            ..OutputConfig::default()
        },
        ..Config::default()
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let (outcome, saved) = tokio::time::timeout(
        Duration::from_secs(10),
        fetch_and_save(&config, "test-key".to_string(), cancel),
    )
    .await
    .expect("cancellation should end the wait")
    .expect("fetch and save");

    assert_eq!(outcome.stop_reason, StopReason::Interrupted);

    let saved = saved.expect("partial records are written");
    assert_eq!(saved, raw.path().join("random_books_data_1.csv"));

    let rows = load_raw_file(&saved).unwrap();
    let titles: Vec<&str> = rows.iter().filter_map(|r| r.title.as_deref()).collect();
    assert_eq!(titles, vec!["Book 0", "Book 1"]);
}

#[tokio::test]
async fn test_fetch_without_results_writes_nothing() {
    let server = MockServer::start().await;
    let raw = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(VOLUMES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&server)
        .await;

    let config = Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.uri(), VOLUMES_PATH),
            ..ApiConfig::default()
        },
        fetch: FetchConfig {
            max_empty_queries: 2,
            request_delay_ms: 0,
            ..FetchConfig::default()
        },
        output: OutputConfig {
            raw_directory: raw.path().display().to_string(),
            ..OutputConfig::default()
        },
        ..Config::default()
    };

    let (outcome, saved) = fetch_and_save(&config, "test-key".to_string(), CancellationToken::new())
        .await
        .expect("fetch and save");

    assert_eq!(outcome.stop_reason, StopReason::Exhausted);
    assert!(saved.is_none());
    assert_eq!(std::fs::read_dir(raw.path()).unwrap().count(), 0);
}
