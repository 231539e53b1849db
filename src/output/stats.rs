//! Statistics generation from crawl results
//!
//! This module provides functionality for summarizing a crawl or a batch
//! scrapability check and printing the summary at completion.

use crate::crawler::AggregatedEmails;
use crate::robots::ScrapeStatus;
use crate::state::CrawlState;
use crate::url::extract_domain;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Origins selected from the input table
    pub origins_total: usize,

    /// Origins with at least one fetched URL
    pub origins_crawled: usize,

    /// Origins taken from an earlier checkpoint
    pub origins_resumed: usize,

    /// Origins with at least one email after filtering
    pub origins_with_emails: usize,

    /// Distinct URLs fetched
    pub urls_fetched: usize,

    /// Count of URLs by status code (`-1` for no response)
    pub status_counts: BTreeMap<i32, usize>,

    /// Number of distinct domains among fetched URLs
    pub unique_domains: usize,

    /// Emails across all origins after filtering
    pub total_emails: usize,

    /// Whether the run stopped early
    pub interrupted: bool,

    /// Files written by the run
    pub artifacts: Vec<PathBuf>,
}

impl CrawlStatistics {
    /// Computes statistics from the final crawl state
    pub fn from_crawl(
        origins_total: usize,
        state: &CrawlState,
        aggregated: &AggregatedEmails,
    ) -> Self {
        let mut status_counts = BTreeMap::new();
        let mut domains = BTreeSet::new();

        for record in state.records.values() {
            *status_counts.entry(record.status_code).or_insert(0) += 1;
            if let Some(domain) = Url::parse(&record.url).ok().as_ref().and_then(extract_domain)
            {
                domains.insert(domain);
            }
        }

        Self {
            origins_total,
            origins_crawled: state.origins_processed(),
            origins_with_emails: aggregated.values().filter(|e| !e.is_empty()).count(),
            urls_fetched: state.records.len(),
            status_counts,
            unique_domains: domains.len(),
            total_emails: aggregated.values().map(|e| e.len()).sum(),
            ..Self::default()
        }
    }

    /// URLs that produced no HTTP response
    pub fn failed_fetches(&self) -> usize {
        self.status_counts.get(&-1).copied().unwrap_or(0)
    }
}

/// Prints crawl statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Origins selected: {}", stats.origins_total);
    println!("  Origins crawled: {}", stats.origins_crawled);
    if stats.origins_resumed > 0 {
        println!("  Origins resumed from checkpoint: {}", stats.origins_resumed);
    }
    println!("  Origins with emails: {}", stats.origins_with_emails);
    println!("  Emails found: {}", stats.total_emails);
    println!("  URLs fetched: {}", stats.urls_fetched);
    println!("  Unique domains: {}", stats.unique_domains);
    println!();

    println!("URLs by Status:");
    for (status, count) in &stats.status_counts {
        let label = if *status < 0 {
            "no response".to_string()
        } else {
            status.to_string()
        };
        let percentage = if stats.urls_fetched > 0 {
            (*count as f64 / stats.urls_fetched as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", label, count, percentage);
    }
    println!();

    if stats.interrupted {
        println!("Run was interrupted; rerun without --fresh to resume.\n");
    }

    if !stats.artifacts.is_empty() {
        println!("Files:");
        for path in &stats.artifacts {
            println!("  {}", path.display());
        }
    }
}

/// Counts batch checker results by status
pub fn scrapability_counts(statuses: &[ScrapeStatus]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        *counts.entry(status.as_cell()).or_insert(0) += 1;
    }
    counts
}

/// Prints a batch checker summary to stdout
pub fn print_scrapability_summary(statuses: &[ScrapeStatus], output: &std::path::Path) {
    println!("=== Scrapability ===\n");
    println!("  Websites checked: {}", statuses.len());
    for (cell, count) in scrapability_counts(statuses) {
        println!("  {}: {}", cell, count);
    }
    println!();
    println!("Output file: {}", output.display());
}
