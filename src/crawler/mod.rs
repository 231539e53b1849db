//! Crawler module for page fetching and email extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and TLS downgrade
//! - Email extraction from page text
//! - Contact link discovery
//! - Per-origin aggregation
//! - Overall crawl coordination

mod aggregate;
mod coordinator;
mod emails;
mod fetcher;
mod parser;
mod retry;

pub use aggregate::{aggregate, AggregatedEmails};
pub use coordinator::{Coordinator, CrawlOutcome};
pub use emails::{is_denied, EmailExtractor, EmailSet};
pub use fetcher::{build_http_client, FetchOutcome, FetchResult, PageFetcher, FAILED_STATUS};
pub use parser::ContactLinkDiscoverer;
pub use retry::RetryPolicy;
