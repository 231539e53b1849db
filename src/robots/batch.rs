//! Parallel scrapability checking
//!
//! Every website gets its own task. A semaphore bounds how many run at once,
//! each task is cut off after the configured timeout, and a single collector
//! loop writes results back by row index, so one hung site never holds up the
//! rest of the table.

use crate::config::Config;
use crate::robots::{ScrapabilityChecker, ScrapeDecision};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Per-row result of the batch checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeStatus {
    Allowed,
    Disallowed,
    Skipped,
    TimedOut,
}

impl ScrapeStatus {
    /// The value written to the scrapability column
    pub fn as_cell(&self) -> &'static str {
        match self {
            Self::Allowed => "True",
            Self::Disallowed => "False",
            Self::Skipped => "site skipped",
            Self::TimedOut => "timed out",
        }
    }
}

impl From<ScrapeDecision> for ScrapeStatus {
    fn from(decision: ScrapeDecision) -> Self {
        match decision {
            ScrapeDecision::Allowed => Self::Allowed,
            ScrapeDecision::Disallowed => Self::Disallowed,
            ScrapeDecision::Skipped(_) => Self::Skipped,
        }
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cell())
    }
}

/// Bounded-concurrency dispatcher over a `ScrapabilityChecker`
#[derive(Debug, Clone)]
pub struct BatchChecker {
    checker: ScrapabilityChecker,
    workers: usize,
    task_timeout: Duration,
}

impl BatchChecker {
    pub fn new(checker: ScrapabilityChecker, workers: usize, task_timeout: Duration) -> Self {
        Self {
            checker,
            workers: workers.max(1),
            task_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            ScrapabilityChecker::from_config(config)?,
            config.scrapability.worker_count(),
            config.scrapability.task_timeout(),
        ))
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Checks every website cell, returning one status per input in order
    ///
    /// Empty cells are `Skipped` without a request. A task still running
    /// when its timeout expires is recorded as `TimedOut`.
    pub async fn check_all(&self, websites: &[Option<String>]) -> Vec<ScrapeStatus> {
        let total = websites.len();
        let mut results = vec![ScrapeStatus::Skipped; total];
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<(usize, ScrapeStatus)> = JoinSet::new();

        tracing::info!(
            "Number of websites to check: {} ({} workers)",
            total,
            self.workers
        );

        for (index, website) in websites.iter().enumerate() {
            let Some(raw) = website.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
                continue;
            };
            let raw = raw.to_string();
            let checker = self.checker.clone();
            let semaphore = Arc::clone(&semaphore);
            let task_timeout = self.task_timeout;

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, ScrapeStatus::Skipped);
                };
                match tokio::time::timeout(task_timeout, checker.check_raw(&raw)).await {
                    Ok(decision) => (index, ScrapeStatus::from(decision)),
                    Err(_) => {
                        tracing::debug!("Scrapability check for {} timed out", raw);
                        (index, ScrapeStatus::TimedOut)
                    }
                }
            });
        }

        let start_time = Instant::now();
        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, status)) => results[index] = status,
                Err(e) => tracing::warn!("Scrapability task failed: {}", e),
            }
            completed += 1;
            if completed % 100 == 0 {
                tracing::info!(
                    "Progress: {} checked    Elapsed time: {:.1} secs",
                    completed,
                    start_time.elapsed().as_secs_f64()
                );
            }
        }

        tracing::info!(
            "Complete. Elapsed time: {:.1} secs",
            start_time.elapsed().as_secs_f64()
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::crawler::{build_http_client, RetryPolicy};

    fn batch() -> BatchChecker {
        let http = HttpConfig {
            timeout_secs: 2,
            connect_timeout_secs: 1,
            ..HttpConfig::default()
        };
        let checker = ScrapabilityChecker::new(
            build_http_client(&http).unwrap(),
            RetryPolicy::none(),
            "*",
        );
        BatchChecker::new(checker, 2, Duration::from_secs(5))
    }

    #[test]
    fn test_cell_values() {
        assert_eq!(ScrapeStatus::Allowed.as_cell(), "True");
        assert_eq!(ScrapeStatus::Disallowed.as_cell(), "False");
        assert_eq!(ScrapeStatus::Skipped.as_cell(), "site skipped");
        assert_eq!(ScrapeStatus::TimedOut.as_cell(), "timed out");
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        let checker = batch().checker;
        assert_eq!(BatchChecker::new(checker, 0, Duration::from_secs(1)).workers(), 1);
    }

    #[tokio::test]
    async fn test_empty_and_unreachable_are_skipped() {
        let websites = vec![
            None,
            Some("   ".to_string()),
            Some("http://127.0.0.1:1/".to_string()),
        ];
        let results = batch().check_all(&websites).await;
        assert_eq!(results, vec![ScrapeStatus::Skipped; 3]);
    }
}
