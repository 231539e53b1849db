//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients from explicit configuration
//! - Classifying request failures into `FetchError` kinds
//! - Retrying connection failures through a `RetryPolicy`
//! - Downgrading to `http://` once after a TLS failure

use crate::config::{Config, HttpConfig};
use crate::crawler::RetryPolicy;
use crate::url::downgrade_to_http;
use crate::{FailureKind, FetchError};
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use url::Url;

/// Status code recorded when no HTTP response was received
pub const FAILED_STATUS: i32 = -1;

/// Failure kinds a page fetch retries
const PAGE_RETRYABLE: &[FailureKind] = &[FailureKind::Connect, FailureKind::ConnectTimeout];

/// How a single page fetch ended
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// A response was received; any status counts, 404 and 500 included
    Success { status: u16, body: String },

    /// Connection, timeout, redirect or protocol failure after retries
    TransportFailure { error: FetchError },

    /// TLS failed and the `http://` fallback did not help
    TlsFailure { error: FetchError },

    /// The URL could not be requested at all
    Malformed { error: FetchError },
}

impl FetchOutcome {
    fn from_error(error: FetchError) -> Self {
        match error {
            FetchError::Tls { .. } => Self::TlsFailure { error },
            FetchError::Malformed { .. } => Self::Malformed { error },
            _ => Self::TransportFailure { error },
        }
    }
}

/// Result of fetching one URL
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL actually requested (the `http://` variant after a downgrade)
    pub url: String,

    pub outcome: FetchOutcome,
}

impl FetchResult {
    /// HTTP status, or `-1` when no response was received
    pub fn status_code(&self) -> i32 {
        match &self.outcome {
            FetchOutcome::Success { status, .. } => i32::from(*status),
            _ => FAILED_STATUS,
        }
    }

    /// Page body, only for successful responses
    pub fn html(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true for a 200 response
    pub fn is_ok(&self) -> bool {
        self.status_code() == 200
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.outcome {
            FetchOutcome::Success { .. } => None,
            FetchOutcome::TransportFailure { error }
            | FetchOutcome::TlsFailure { error }
            | FetchOutcome::Malformed { error } => Some(error),
        }
    }
}

/// Builds an HTTP client from explicit configuration
///
/// # Example
///
/// ```no_run
/// use email_crawler::config::HttpConfig;
/// use email_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .danger_accept_invalid_certs(!config.verify_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

impl FetchError {
    /// Classifies a reqwest error for the request sent to `url`
    ///
    /// reqwest reports TLS failures as connection errors, so the error chain
    /// is inspected to tell the two apart.
    pub fn classify(url: &str, error: &reqwest::Error) -> Self {
        let url = url.to_string();
        let causes = source_chain(error);
        let message = if causes.is_empty() {
            error.to_string()
        } else {
            causes.clone()
        };

        if error.is_timeout() && error.is_connect() {
            Self::ConnectTimeout { url }
        } else if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_redirect() {
            Self::RedirectLimit { url }
        } else if error.is_builder() {
            Self::Malformed { url, message }
        } else if is_tls_message(&causes) {
            Self::Tls { url, message }
        } else if error.is_connect() {
            Self::Connect { url, message }
        } else {
            Self::Other { url, message }
        }
    }
}

/// Joins the sources of an error, leaving out the error itself
///
/// The top-level reqwest message embeds the request URL, which must not take
/// part in classification.
fn source_chain(error: &(dyn StdError + 'static)) -> String {
    let mut parts = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

fn is_tls_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["certificate", "tls", "ssl", "handshake", "corrupt message"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Fetches pages with retry and TLS downgrade
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Builds a fetcher from the `[http]` and `[retry]` sections
    ///
    /// Page fetches also retry connect-phase timeouts; robots.txt checks do not.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(&config.http)?,
            RetryPolicy::from_config(&config.retry).with_retryable(PAGE_RETRYABLE),
        ))
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetches `url`, never failing
    ///
    /// # Request Flow
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Any HTTP response | `Success` with status and body |
    /// | Connection failure | Retry per policy, then `TransportFailure` |
    /// | TLS failure | One fetch of the `http://` URL, then `TlsFailure` |
    /// | Connect timeout | Retry per policy, then `TransportFailure` |
    /// | Timeout, redirect limit | `TransportFailure`, not retried |
    /// | Unusable URL | `Malformed`, not retried |
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let error = match self.get_with_retry(url).await {
            Ok((status, body)) => {
                return FetchResult {
                    url: url.to_string(),
                    outcome: FetchOutcome::Success { status, body },
                }
            }
            Err(error) => error,
        };

        if let FetchError::Tls { .. } = error {
            if let Some(http_url) = downgrade_to_http(url) {
                tracing::debug!("TLS failure for {}, retrying over http", url);
                let outcome = match self.get_with_retry(&http_url).await {
                    Ok((status, body)) => FetchOutcome::Success { status, body },
                    Err(FetchError::Tls { .. }) => FetchOutcome::TlsFailure { error },
                    Err(other) => FetchOutcome::from_error(other),
                };
                return FetchResult {
                    url: http_url.to_string(),
                    outcome,
                };
            }
        }

        tracing::debug!("Fetch failed: {}", error);
        FetchResult {
            url: url.to_string(),
            outcome: FetchOutcome::from_error(error),
        }
    }

    async fn get_with_retry(&self, url: &Url) -> Result<(u16, String), FetchError> {
        self.retry.run(|| self.get_once(url)).await
    }

    async fn get_once(&self, url: &Url) -> Result<(u16, String), FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::classify(url.as_str(), &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::classify(url.as_str(), &e))?;

        Ok((status, body))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
