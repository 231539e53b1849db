use crate::test_config;
use email_crawler::config::CheckpointBackend;
use email_crawler::crawler::Coordinator;
use email_crawler::storage::{
    open_checkpoint, RunStatus, SqliteCheckpoint, CODES_FILE, MAPPING_FILE,
};
use email_crawler::table::{fill_emails, write_table, InputTable};
use email_crawler::Origin;
use std::collections::BTreeMap;
use email_crawler::PageFetcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const ALPHA_HOME: &str = r#"<html><body>
    <p>Write to info@alpha.org for details.</p>
    <a href="/contact">Contact us</a>
    <a href="/programs">Programs</a>
</body></html>"#;

const ALPHA_CONTACT: &str = r#"<html><body>
    <p>Sales: sales@alpha.org</p>
    <p>Form handler: noreply@example.com</p>
</body></html>"#;

/// Serves a homepage linking to a contact page
async fn alpha_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ALPHA_HOME))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ALPHA_CONTACT))
        .mount(&server)
        .await;

    server
}

/// Serves nothing but 404s
async fn missing_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

fn origin(server: &MockServer) -> Origin {
    Origin::parse(&server.uri(), true).unwrap()
}

#[tokio::test]
async fn test_crawl_collects_homepage_and_contact_emails() {
    let alpha = alpha_server().await;
    let missing = missing_server().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), CheckpointBackend::Json);

    let origins = vec![origin(&alpha), origin(&missing)];
    let store = open_checkpoint(&config.checkpoint).unwrap();
    let mut coordinator = Coordinator::new(config, store, true).unwrap();

    let outcome = coordinator.run(&origins).await.unwrap();

    assert!(!outcome.interrupted);
    assert_eq!(outcome.resumed, 0);

    let alpha_emails: Vec<&str> = outcome.aggregated[&0].iter().map(String::as_str).collect();
    assert_eq!(alpha_emails, vec!["info@alpha.org", "sales@alpha.org"]);
    assert!(outcome.aggregated[&1].is_empty());

    let alpha_home = origins[0].as_str().to_string();
    let alpha_contact = format!("{}/contact", alpha.uri());
    assert_eq!(
        outcome.state.mapping.get(0).unwrap(),
        &[alpha_home.clone(), alpha_contact.clone()]
    );

    // The denied address is still part of the raw record
    let contact_record = outcome.state.record_for(&alpha_contact).unwrap();
    assert!(contact_record.emails.contains("noreply@example.com"));

    let missing_record = outcome.state.record_for(origins[1].as_str()).unwrap();
    assert_eq!(missing_record.status_code, 404);
    assert!(missing_record.emails.is_empty());

    let codes: BTreeMap<String, i32> =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(CODES_FILE)).unwrap())
            .unwrap();
    assert_eq!(codes[&alpha_home], 200);
    assert_eq!(codes[&alpha_contact], 200);
    assert_eq!(codes[origins[1].as_str()], 404);

    let mapping: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(MAPPING_FILE)).unwrap())
            .unwrap();
    assert_eq!(mapping["0"].len(), 2);
    assert_eq!(mapping["1"], vec![origins[1].as_str().to_string()]);
}

#[tokio::test]
async fn test_crawl_fills_emails_column() {
    let alpha = alpha_server().await;
    let missing = missing_server().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), CheckpointBackend::Json);

    let mut table = InputTable::from_rows(
        vec!["name".to_string(), "Website".to_string(), "Scrapability".to_string()],
        vec![
            vec!["Alpha".to_string(), alpha.uri(), "True".to_string()],
            vec!["Closed".to_string(), "closed.org".to_string(), "False".to_string()],
            vec!["Missing".to_string(), missing.uri(), "true".to_string()],
        ],
    );
    let targets = table.crawl_targets().unwrap();
    assert_eq!(targets.len(), 2);

    let origins: Vec<Origin> = targets.iter().map(|t| t.origin.clone()).collect();
    let store = open_checkpoint(&config.checkpoint).unwrap();
    let mut coordinator = Coordinator::new(config, store, true).unwrap();
    let outcome = coordinator.run(&origins).await.unwrap();

    fill_emails(&mut table, &targets, &outcome.aggregated);
    let output = dir.path().join("crawled_emails.csv");
    write_table(&table, &output).unwrap();

    let written = InputTable::read(&output).unwrap();
    assert_eq!(written.headers(), &["name", "Website", "Scrapability", "emails"]);
    assert_eq!(written.rows()[0][3], "info@alpha.org; sales@alpha.org");
    assert_eq!(written.rows()[1][3], "");
    assert_eq!(written.rows()[2][3], "");
}

#[tokio::test]
async fn test_resume_skips_checkpointed_origins() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl_state.db");

    let alpha = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<p>hello@alpha.org</p>"),
        )
        .expect(1)
        .mount(&alpha)
        .await;
    let beta = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>office@beta.org</p>"))
        .expect(1)
        .mount(&beta)
        .await;

    let origins = vec![origin(&alpha), origin(&beta)];

    // First run covers only the first origin
    {
        let config = test_config(dir.path(), CheckpointBackend::Sqlite);
        let store = Box::new(SqliteCheckpoint::new(&db_path).unwrap());
        let mut coordinator = Coordinator::new(config, store, false).unwrap();
        let outcome = coordinator.run(&origins[..1]).await.unwrap();
        assert_eq!(outcome.state.origins_processed(), 1);
    }

    let config = test_config(dir.path(), CheckpointBackend::Sqlite);
    let store = Box::new(SqliteCheckpoint::new(&db_path).unwrap());
    let mut coordinator = Coordinator::new(config, store, false).unwrap();
    let outcome = coordinator.run(&origins).await.unwrap();

    assert_eq!(outcome.resumed, 1);
    assert_eq!(outcome.state.origins_processed(), 2);
    assert!(outcome.aggregated[&0].contains("hello@alpha.org"));
    assert!(outcome.aggregated[&1].contains("office@beta.org"));

    let run = SqliteCheckpoint::new(&db_path)
        .unwrap()
        .latest_run()
        .unwrap()
        .unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_shutdown_before_start_saves_empty_checkpoint() {
    let alpha = alpha_server().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), CheckpointBackend::Json);

    let store = open_checkpoint(&config.checkpoint).unwrap();
    let mut coordinator = Coordinator::new(config, store, true)
        .unwrap()
        .with_shutdown(Arc::new(AtomicBool::new(true)));

    let outcome = coordinator.run(&[origin(&alpha)]).await.unwrap();

    assert!(outcome.interrupted);
    assert_eq!(outcome.state.origins_processed(), 0);
    assert!(outcome.aggregated.is_empty());
    assert!(dir.path().join(MAPPING_FILE).exists());
}

#[tokio::test]
async fn test_unreachable_origin_is_recorded_as_failure() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), CheckpointBackend::Json);

    let unreachable = Origin::parse("http://127.0.0.1:1", true).unwrap();
    let store = open_checkpoint(&config.checkpoint).unwrap();
    let mut coordinator = Coordinator::new(config, store, true).unwrap();
    let outcome = coordinator.run(&[unreachable.clone()]).await.unwrap();

    let record = outcome.state.record_for(unreachable.as_str()).unwrap();
    assert_eq!(record.status_code, -1);
    assert!(outcome.aggregated[&0].is_empty());
}

/// Serves a page and raises the shutdown flag while doing so
struct ShutdownAfterServing {
    body: &'static str,
    flag: Arc<AtomicBool>,
}

impl Respond for ShutdownAfterServing {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.flag.store(true, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_string(self.body)
    }
}

#[tokio::test]
async fn test_shutdown_between_contact_pages_drops_partial_origin() {
    let flag = Arc::new(AtomicBool::new(false));
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ShutdownAfterServing {
            body: ALPHA_HOME,
            flag: Arc::clone(&flag),
        })
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ALPHA_CONTACT))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), CheckpointBackend::Json);
    let store = open_checkpoint(&config.checkpoint).unwrap();
    let mut coordinator = Coordinator::new(config, store, true)
        .unwrap()
        .with_shutdown(flag);

    let outcome = coordinator.run(&[origin(&server)]).await.unwrap();

    assert!(outcome.interrupted);
    assert!(outcome.state.mapping.get(0).is_none());
    assert!(outcome.state.records.is_empty());
    assert!(outcome.aggregated.is_empty());

    let mapping: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(MAPPING_FILE)).unwrap())
            .unwrap();
    assert!(mapping.is_empty());
}

#[tokio::test]
async fn test_failed_contact_pages_stay_in_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <p>office@gamma.org</p>
                <a href="/contact">Contact</a>
                <a href="http://127.0.0.1:1/contact">Regional contact</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<p>lost@gamma.org</p>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), CheckpointBackend::Json);
    let gamma = origin(&server);
    let store = open_checkpoint(&config.checkpoint).unwrap();
    let mut coordinator = Coordinator::new(config, store, true).unwrap();

    let outcome = coordinator.run(&[gamma.clone()]).await.unwrap();

    let missing = format!("{}/contact", server.uri());
    let unreachable = "http://127.0.0.1:1/contact".to_string();
    assert_eq!(
        outcome.state.mapping.get(0).unwrap(),
        &[gamma.as_str().to_string(), missing.clone(), unreachable.clone()]
    );
    assert_eq!(outcome.state.record_for(&missing).unwrap().status_code, 404);
    assert_eq!(outcome.state.record_for(&unreachable).unwrap().status_code, -1);

    // Only the 200 homepage contributes addresses
    let emails: Vec<&str> = outcome.aggregated[&0].iter().map(String::as_str).collect();
    assert_eq!(emails, vec!["office@gamma.org"]);
}

#[tokio::test]
async fn test_tls_failure_downgrades_page_fetch_to_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>info@delta.org</p>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let fetcher =
        PageFetcher::from_config(&test_config(dir.path(), CheckpointBackend::Json)).unwrap();

    // The mock server speaks plain http, so the https handshake fails
    let port = server.address().port();
    let https = Url::parse(&format!("https://127.0.0.1:{}/", port)).unwrap();
    let result = fetcher.fetch(&https).await;

    assert_eq!(result.url, format!("http://127.0.0.1:{}/", port));
    assert_eq!(result.status_code(), 200);
    assert_eq!(result.html(), Some("<p>info@delta.org</p>"));
}
