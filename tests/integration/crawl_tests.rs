//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including the result sinks.

use job_harvest::config::{Config, CrawlConfig, SourceConfig};
use job_harvest::crawler::{crawl, Coordinator, HttpFetcher, RandomDelay};
use job_harvest::output::{write_all, CsvSink, ResultSink};
use job_harvest::state::PageStatus;
use job_harvest::storage::{RunStatus, SqliteStorage, Storage};
use job_harvest::{ConfigError, HarvestError, JobRecord};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, max_pages: u32) -> Config {
    Config {
        crawler: CrawlConfig {
            locality: "ankara".to_string(),
            max_pages,
            min_delay_seconds: 0.0,
            max_delay_seconds: 0.01,
            request_timeout_seconds: 2.0,
            ..CrawlConfig::default()
        },
        source: SourceConfig {
            base_url: base_url.to_string(),
            search_path: "is-ilanlari".to_string(),
            user_agent: "HarvestTest/1.0".to_string(),
            ..SourceConfig::default()
        },
        ..Config::default()
    }
}

fn listing(title: &str, company: &str, location: Option<&str>) -> String {
    let location = location
        .map(|l| format!(r#"<span class="location">{}</span>"#, l))
        .unwrap_or_default();
    format!(
        r#"<div class="list-item"><a class="job-title">{}</a><span class="company-name">{}</span>{}</div>"#,
        title, company, location
    )
}

fn html_page(listings: &[String]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>Results</title></head><body>{}</body></html>",
            listings.concat()
        ))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/is-ilanlari"))
        .and(query_param("sehir", "ankara"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_with_mixed_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        html_page(&[
            listing("Yazılım Geliştirici", "Acme", Some("Çankaya")),
            listing("Muhasebeci", "Globex", None),
            r#"<div class="list-item"><a class="job-title">No company</a></div>"#.to_string(),
        ]),
    )
    .await;
    mount_page(&mock_server, 2, ResponseTemplate::new(500)).await;
    mount_page(&mock_server, 3, html_page(&[])).await;
    mount_page(
        &mock_server,
        4,
        html_page(&[listing("Satış Temsilcisi", "Initech", Some("Keçiören"))]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 4);
    let outcome = crawl(&config, &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(
        outcome.records,
        vec![
            JobRecord::new("Yazılım Geliştirici", "Acme", "Çankaya"),
            JobRecord::new("Muhasebeci", "Globex", "ankara"),
            JobRecord::new("Satış Temsilcisi", "Initech", "Keçiören"),
        ]
    );
    assert_eq!(outcome.pages_attempted, 4);
    assert_eq!(outcome.pages_succeeded, 2);
    assert_eq!(outcome.pages_failed, 1);
    assert_eq!(outcome.pages_empty, 1);
    assert_eq!(outcome.pages[1].status, PageStatus::HttpError(500));
    assert_eq!(outcome.pages[2].status, PageStatus::Empty);
    assert!(!outcome.cancelled);
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .respond_with(html_page(&[listing("Job", "Co", None)]))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let outcome = crawl(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.records.len(), 2);
}

#[tokio::test]
async fn test_timeout_only_affects_its_page() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        html_page(&[listing("Slow", "Co", None)]).set_delay(Duration::from_secs(5)),
    )
    .await;
    mount_page(&mock_server, 2, html_page(&[listing("Fast", "Co", None)])).await;

    let mut config = create_test_config(&mock_server.uri(), 2);
    config.crawler.request_timeout_seconds = 0.3;

    let outcome = crawl(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.pages_failed, 1);
    assert!(matches!(outcome.pages[0].status, PageStatus::NetworkError(_)));
    assert_eq!(outcome.records, vec![JobRecord::new("Fast", "Co", "ankara")]);
}

#[tokio::test]
async fn test_unreachable_source_completes_with_zero_records() {
    let config = create_test_config("http://127.0.0.1:1", 3);

    let outcome = crawl(&config, &CancellationToken::new()).await.unwrap();

    assert!(outcome.is_empty());
    assert_eq!(outcome.pages_failed, 3);
}

#[tokio::test]
async fn test_zero_pages_never_contacts_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 0);
    let result = crawl(&config, &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_transient_failure_retried_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, html_page(&[listing("Second try", "Co", None)])).await;

    let mut config = create_test_config(&mock_server.uri(), 1);
    config.crawler.max_retries = 1;

    let outcome = crawl(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.pages[0].attempts, 2);
}

#[tokio::test]
async fn test_concurrent_crawl_keeps_page_order() {
    let mock_server = MockServer::start().await;

    for page in 1..=4u32 {
        let delay = Duration::from_millis(u64::from(5 - page) * 60);
        mount_page(
            &mock_server,
            page,
            html_page(&[listing(&format!("Job {}", page), "Co", None)]).set_delay(delay),
        )
        .await;
    }

    let mut config = create_test_config(&mock_server.uri(), 4);
    config.crawler.max_concurrent_pages = 4;

    let coordinator = Coordinator::new(
        &config,
        HttpFetcher::new(&config.source).unwrap(),
        RandomDelay::from_config(&config.crawler),
    )
    .unwrap();
    let outcome = coordinator.run().await;

    let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Job 1", "Job 2", "Job 3", "Job 4"]);
}

#[tokio::test]
async fn test_outcome_written_to_csv_and_sqlite() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        1,
        html_page(&[
            listing("Garson", "Lokanta, Ltd.", Some("Ulus")),
            listing("Aşçı", "Lokanta, Ltd.", None),
        ]),
    )
    .await;
    mount_page(&mock_server, 2, ResponseTemplate::new(404)).await;

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("meslekler.csv");
    let db_path = dir.path().join("jobs.db");

    let config = create_test_config(&mock_server.uri(), 2);
    let outcome = crawl(&config, &CancellationToken::new()).await.unwrap();

    let mut csv_sink = CsvSink::new(&csv_path);
    let mut db_sink = SqliteStorage::new(&db_path)
        .unwrap()
        .begin_run("test-hash", "ankara")
        .unwrap();
    {
        let mut sinks: Vec<&mut dyn ResultSink> = vec![&mut csv_sink, &mut db_sink];
        write_all(&mut sinks, &outcome).unwrap();
    }

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(
        lines,
        vec![
            "job_title,company,location,job_type",
            "Garson,\"Lokanta, Ltd.\",Ulus,Unknown",
            "Aşçı,\"Lokanta, Ltd.\",ankara,Unknown",
        ]
    );

    let run_id = db_sink.run_id();
    let storage = db_sink.into_storage();
    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_failed, 1);
    assert_eq!(storage.get_jobs(run_id).unwrap(), outcome.records);
}
