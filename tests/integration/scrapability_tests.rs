use crate::test_config;
use email_crawler::config::CheckpointBackend;
use email_crawler::robots::{BatchChecker, ScrapeStatus, SkipReason};
use email_crawler::{ScrapabilityChecker, ScrapeDecision};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn robots_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn checker(dir: &TempDir) -> ScrapabilityChecker {
    let config = test_config(dir.path(), CheckpointBackend::Json);
    ScrapabilityChecker::from_config(&config).unwrap()
}

fn origin(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).unwrap()
}

#[tokio::test]
async fn test_missing_robots_allows() {
    let server = robots_server(ResponseTemplate::new(404)).await;
    let dir = TempDir::new().unwrap();

    let decision = checker(&dir).check(&origin(&server)).await;
    assert_eq!(decision, ScrapeDecision::Allowed);
}

#[tokio::test]
async fn test_disallow_all_robots() {
    let server = robots_server(
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"),
    )
    .await;
    let dir = TempDir::new().unwrap();

    let decision = checker(&dir).check(&origin(&server)).await;
    assert_eq!(decision, ScrapeDecision::Disallowed);
}

#[tokio::test]
async fn test_path_rules_apply_to_origin_path() {
    let server = robots_server(
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let checker = checker(&dir);

    let root = origin(&server);
    let private = root.join("private/").unwrap();

    assert_eq!(checker.check(&root).await, ScrapeDecision::Allowed);
    assert_eq!(checker.check(&private).await, ScrapeDecision::Disallowed);
}

#[tokio::test]
async fn test_forbidden_robots_disallows() {
    let server = robots_server(ResponseTemplate::new(403)).await;
    let dir = TempDir::new().unwrap();

    let decision = checker(&dir).check(&origin(&server)).await;
    assert_eq!(decision, ScrapeDecision::Disallowed);
}

#[tokio::test]
async fn test_slow_robots_is_skipped() {
    let server = robots_server(
        ResponseTemplate::new(200)
            .set_body_string("User-agent: *\nAllow: /\n")
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let dir = TempDir::new().unwrap();

    let decision = checker(&dir).check(&origin(&server)).await;
    assert_eq!(decision, ScrapeDecision::Skipped(SkipReason::Timeout));
}

#[tokio::test]
async fn test_raw_cells() {
    let server = robots_server(ResponseTemplate::new(404)).await;
    let dir = TempDir::new().unwrap();
    let checker = checker(&dir);

    assert_eq!(checker.check_raw(&server.uri()).await, ScrapeDecision::Allowed);
    assert_eq!(
        checker.check_raw("ftp://files.alpha.org").await,
        ScrapeDecision::Skipped(SkipReason::MalformedUrl)
    );
    assert_eq!(
        checker.check_raw("http://127.0.0.1:1").await,
        ScrapeDecision::Skipped(SkipReason::Transport)
    );
}

#[tokio::test]
async fn test_batch_keeps_row_order_and_times_out_slow_sites() {
    let open = robots_server(ResponseTemplate::new(404)).await;
    let closed = robots_server(
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"),
    )
    .await;

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(800)))
        .mount(&slow)
        .await;

    let dir = TempDir::new().unwrap();
    let batch = BatchChecker::new(checker(&dir), 2, Duration::from_millis(300));

    let websites = vec![
        Some(slow.uri()),
        Some(open.uri()),
        None,
        Some(closed.uri()),
    ];
    let statuses = batch.check_all(&websites).await;

    assert_eq!(
        statuses,
        vec![
            ScrapeStatus::TimedOut,
            ScrapeStatus::Allowed,
            ScrapeStatus::Skipped,
            ScrapeStatus::Disallowed,
        ]
    );
}

#[tokio::test]
async fn test_tls_failure_checks_robots_over_http() {
    let server = robots_server(
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"),
    )
    .await;
    let dir = TempDir::new().unwrap();

    // The mock server speaks plain http, so the https handshake fails
    let https = Url::parse(&format!("https://127.0.0.1:{}/", server.address().port())).unwrap();
    let decision = checker(&dir).check(&https).await;

    assert_eq!(decision, ScrapeDecision::Disallowed);
}
