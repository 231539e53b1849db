//! Integration tests for the email crawler
//!
//! These tests use wiremock to serve websites and robots.txt files and run
//! the crawl and scrapability paths end-to-end.

mod crawl_tests;
mod scrapability_tests;

use email_crawler::config::{CheckpointBackend, Config};
use std::path::Path;

/// Builds a configuration with short timeouts and a checkpoint in `dir`
pub fn test_config(dir: &Path, backend: CheckpointBackend) -> Config {
    let mut config = Config::default();
    config.http.timeout_secs = 1;
    config.http.connect_timeout_secs = 1;
    config.retry.max_attempts = 2;
    config.retry.backoff_ms = 10;
    config.checkpoint.backend = backend;
    config.checkpoint.directory = dir.to_string_lossy().into_owned();
    config.checkpoint.interval = 1;
    config
}
