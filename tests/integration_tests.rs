//! Integration tests for Book Harvest
//!
//! These tests run a full harvest against a local mock of the volumes endpoint.

use book_harvest::config::Config;
use book_harvest::harvest::VOLUMES_PATH;
use book_harvest::utils::{RecordingSleeper, Sleeper};
use book_harvest::Harvester;
use mockito::{Matcher, Mock, ServerGuard};
use std::sync::Arc;
use std::time::Duration;

const EMPTY_PAGE: &str = r#"{"kind": "books#volumes", "totalItems": 0}"#;

fn page_query(query: &str, start_index: u32) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("q".into(), query.into()),
        Matcher::UrlEncoded("startIndex".into(), start_index.to_string()),
        Matcher::UrlEncoded("maxResults".into(), "40".into()),
        Matcher::UrlEncoded("key".into(), "integration-key".into()),
    ])
}

async fn mock_page(server: &mut ServerGuard, query: &str, start_index: u32, body: &str) -> Mock {
    server
        .mock("GET", VOLUMES_PATH)
        .match_query(page_query(query, start_index))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

fn config_for(server: &ServerGuard, queries: &[&str], output: std::path::PathBuf) -> Config {
    Config {
        api_key: Some("integration-key".to_string()),
        api_base: server.url(),
        queries: queries.iter().map(|q| q.to_string()).collect(),
        max_start_index: 80,
        output_path: output,
        ..Config::default()
    }
}

fn harvester(config: &Config) -> (Harvester, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::new());
    let shared: Arc<dyn Sleeper> = sleeper.clone();
    (Harvester::with_sleeper(config, shared).unwrap(), sleeper)
}

#[tokio::test]
async fn test_end_to_end_dedup_keeps_first_query() {
    let mut server = mockito::Server::new_async().await;

    let history = r#"{"items": [
        {"volumeInfo": {"title": "The Histories", "authors": ["Herodotus"], "averageRating": 4.0}},
        {"volumeInfo": {"title": "SPQR", "authors": ["Mary Beard"], "pageCount": 608}}
    ]}"#;
    // Same titles, different metadata: must be dropped as duplicates
    let fantasy = r#"{"items": [
        {"volumeInfo": {"title": "SPQR", "authors": ["Someone Else"], "language": "la"}},
        {"volumeInfo": {"title": "The Histories", "categories": ["Fiction"]}}
    ]}"#;

    let mocks = vec![
        mock_page(&mut server, "history", 0, history).await,
        mock_page(&mut server, "history", 40, EMPTY_PAGE).await,
        mock_page(&mut server, "fantasy", 0, fantasy).await,
        mock_page(&mut server, "fantasy", 40, EMPTY_PAGE).await,
    ];

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("books.csv");
    let config = config_for(&server, &["history", "fantasy"], output.clone());
    let (harvester, sleeper) = harvester(&config);

    let summary = harvester.run().await.unwrap();

    for mock in &mocks {
        mock.assert_async().await;
    }

    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.duplicates, 2);
    assert_eq!(summary.failed_pages, 0);
    assert_eq!(summary.output_path, output);
    // one politeness pause per successful page
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(500); 4]);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "title",
            "authors",
            "publishedDate",
            "categories",
            "averageRating",
            "ratingsCount",
            "description",
            "pageCount",
            "language",
            "previewLink",
            "query"
        ]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], "The Histories");
    assert_eq!(&rows[0][1], r#"["Herodotus"]"#);
    assert_eq!(&rows[0][3], "");
    assert_eq!(&rows[0][4], "4.0");
    assert_eq!(&rows[0][10], "history");

    assert_eq!(&rows[1][0], "SPQR");
    assert_eq!(&rows[1][1], r#"["Mary Beard"]"#);
    // missing averageRating is an empty cell, not an omitted column
    assert_eq!(&rows[1][4], "");
    assert_eq!(&rows[1][7], "608");
    assert_eq!(&rows[1][8], "");
    assert_eq!(&rows[1][10], "history");
}

#[tokio::test]
async fn test_failed_pages_do_not_abort_run() {
    let mut server = mockito::Server::new_async().await;

    let art = r#"{"items": [{"volumeInfo": {"title": "The Story of Art"}}]}"#;
    let _art_first = mock_page(&mut server, "art", 0, art).await;
    let _art_second = server
        .mock("GET", VOLUMES_PATH)
        .match_query(page_query("art", 40))
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let _music = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::UrlEncoded("q".into(), "music".into()))
        .with_status(404)
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["art", "music"], dir.path().join("books.csv"));
    let (harvester, sleeper) = harvester(&config);

    let summary = harvester.run().await.unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.failed_pages, 3);
    assert_eq!(summary.records[0].query, "art");
    // HTTP error statuses are not retried, so only the single politeness pause is recorded
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(500)]);
}

#[tokio::test]
async fn test_no_results_writes_header_only() {
    let mut server = mockito::Server::new_async().await;
    let _first = mock_page(&mut server, "travel", 0, EMPTY_PAGE).await;
    let _second = mock_page(&mut server, "travel", 40, EMPTY_PAGE).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("books.csv");
    let config = config_for(&server, &["travel"], output.clone());
    let (harvester, _) = harvester(&config);

    let summary = harvester.run().await.unwrap();

    assert_eq!(summary.fetched, 0);
    assert_eq!(summary.written, 0);
    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with("title,authors,"));
}

#[tokio::test]
async fn test_malformed_body_aborts_run() {
    let mut server = mockito::Server::new_async().await;
    let _broken = mock_page(&mut server, "health", 0, "not json").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("books.csv");
    let config = config_for(&server, &["health"], output.clone());
    let (harvester, _) = harvester(&config);

    let result = harvester.run().await;

    assert!(matches!(
        result,
        Err(book_harvest::HarvestError::Parse(_))
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_api_key_fails_before_network() {
    let config = Config {
        api_key: None,
        api_base: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    };

    let result = Harvester::new(&config);
    assert!(matches!(
        result,
        Err(book_harvest::HarvestError::Config(
            book_harvest::config::ConfigError::MissingApiKey
        ))
    ));
}
