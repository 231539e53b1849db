//! Retry policy for network requests
//!
//! A policy names the failure kinds it retries, how many attempts it makes
//! and how long it waits between them. Everything else fails on the first
//! attempt.

use crate::config::RetryConfig;
use crate::{FailureKind, FetchError};
use std::future::Future;
use std::time::Duration;

/// Retry strategy applied to one logical request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    max_attempts: u32,

    /// Fixed delay between attempts
    backoff: Duration,

    /// Failure kinds that trigger another attempt
    retryable: Vec<FailureKind>,
}

impl RetryPolicy {
    /// Creates a policy that retries connection failures only
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retryable: vec![FailureKind::Connect],
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff())
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Replaces the set of retryable failure kinds
    pub fn with_retryable(mut self, kinds: &[FailureKind]) -> Self {
        self.retryable = kinds.to_vec();
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.contains(&kind)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable kind,
    /// or the attempt budget is spent
    ///
    /// The error of the last attempt is returned on failure.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.max_attempts || !self.is_retryable(error.kind()) {
                        return Err(error);
                    }
                    tracing::debug!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        error,
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn connect_error() -> FetchError {
        FetchError::Connect {
            url: "http://acme.org/".to_string(),
            message: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(), Duration::from_secs(1));
        assert!(policy.is_retryable(FailureKind::Connect));
        assert!(!policy.is_retryable(FailureKind::Timeout));
        assert!(!policy.is_retryable(FailureKind::Tls));
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_retries_connect_until_budget_spent() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(connect_error())
            })
            .await;

        assert!(matches!(result, Err(FetchError::Connect { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_timeout() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Timeout {
                    url: "http://acme.org/".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failure() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = &AtomicU32::new(0);

        let result = policy
            .run(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(connect_error())
                } else {
                    Ok(200u16)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_retryable_kinds() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1))
            .with_retryable(&[FailureKind::Timeout]);
        let calls = &AtomicU32::new(0);

        let _: Result<(), _> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(connect_error())
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
