//! Scrapability checks against a site's robots.txt
//!
//! The checker fetches `robots.txt` from the site root, turns the response
//! into a `ParsedRobots` policy and asks whether the origin URL itself may be
//! fetched by the generic agent.

use crate::config::Config;
use crate::crawler::{build_http_client, RetryPolicy};
use crate::robots::ParsedRobots;
use crate::url::{downgrade_to_http, robots_url};
use crate::{FailureKind, FetchError};
use reqwest::Client;
use std::fmt;
use url::Url;

/// Why an origin could not be checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Connection failed after retries
    Transport,
    /// TLS failed over https and the http fallback failed too
    Tls,
    /// The origin is not a usable URL
    MalformedUrl,
    /// The robots request timed out
    Timeout,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Transport => "transport failure",
            Self::Tls => "TLS failure",
            Self::MalformedUrl => "malformed URL",
            Self::Timeout => "timeout",
        };
        f.write_str(reason)
    }
}

/// Outcome of a scrapability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeDecision {
    Allowed,
    Disallowed,
    Skipped(SkipReason),
}

impl ScrapeDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    fn from_error(error: &FetchError) -> Self {
        match error.kind() {
            FailureKind::Redirect => Self::Allowed,
            FailureKind::Timeout | FailureKind::ConnectTimeout => {
                Self::Skipped(SkipReason::Timeout)
            }
            FailureKind::Malformed => Self::Skipped(SkipReason::MalformedUrl),
            FailureKind::Tls => Self::Skipped(SkipReason::Tls),
            FailureKind::Connect | FailureKind::Other => Self::Skipped(SkipReason::Transport),
        }
    }
}

/// Checks robots.txt policy for origins
#[derive(Debug, Clone)]
pub struct ScrapabilityChecker {
    client: Client,
    retry: RetryPolicy,
    user_agent: String,
}

impl ScrapabilityChecker {
    pub fn new(client: Client, retry: RetryPolicy, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            retry,
            user_agent: user_agent.into(),
        }
    }

    /// Builds a checker from the `[http]`, `[retry]` and `[scrapability]` sections
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(&config.http)?,
            RetryPolicy::from_config(&config.retry),
            config.scrapability.robots_user_agent.clone(),
        ))
    }

    /// Parses and checks a raw website cell
    pub async fn check_raw(&self, raw: &str) -> ScrapeDecision {
        match crate::url::normalize_origin(raw) {
            Ok(url) => self.check(&url).await,
            Err(e) => {
                tracing::debug!("Skipping {:?}: {}", raw, e);
                ScrapeDecision::Skipped(SkipReason::MalformedUrl)
            }
        }
    }

    /// Decides whether `origin` may be scraped
    ///
    /// # Decision Table
    ///
    /// | Condition | Decision |
    /// |-----------|----------|
    /// | robots.txt 2xx | Rules matched against the origin URL |
    /// | robots.txt 401/403 or 5xx | `Disallowed` |
    /// | robots.txt other 4xx | `Allowed` |
    /// | Too many redirects | `Allowed` |
    /// | Connection failure (after retries) | `Skipped(Transport)` |
    /// | TLS failure (after one http attempt) | `Skipped(Tls)` |
    /// | Timeout | `Skipped(Timeout)` |
    pub async fn check(&self, origin: &Url) -> ScrapeDecision {
        match self.read_robots(origin).await {
            Ok(robots) => self.decide(&robots, origin),
            Err(FetchError::Tls { .. }) => match downgrade_to_http(origin) {
                Some(http_origin) => {
                    tracing::debug!("TLS failure for {}, retrying over http", origin);
                    match self.read_robots(&http_origin).await {
                        Ok(robots) => self.decide(&robots, &http_origin),
                        Err(e) => {
                            tracing::debug!("Skipping {}: {}", origin, e);
                            ScrapeDecision::Skipped(SkipReason::Tls)
                        }
                    }
                }
                None => ScrapeDecision::Skipped(SkipReason::Tls),
            },
            Err(e) => {
                tracing::debug!("robots.txt unavailable for {}: {}", origin, e);
                ScrapeDecision::from_error(&e)
            }
        }
    }

    fn decide(&self, robots: &ParsedRobots, origin: &Url) -> ScrapeDecision {
        if robots.is_allowed(origin.as_str(), &self.user_agent) {
            ScrapeDecision::Allowed
        } else {
            ScrapeDecision::Disallowed
        }
    }

    async fn read_robots(&self, origin: &Url) -> Result<ParsedRobots, FetchError> {
        let url = robots_url(origin);
        self.retry.run(|| self.fetch_robots(&url)).await
    }

    async fn fetch_robots(&self, url: &Url) -> Result<ParsedRobots, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::classify(url.as_str(), &e))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Ok(ParsedRobots::from_response(status, ""));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::classify(url.as_str(), &e))?;
        Ok(ParsedRobots::from_response(status, &body))
    }
}
