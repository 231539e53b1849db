//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// How a robots.txt resource governs a site
#[derive(Debug, Clone, PartialEq, Eq)]
enum Policy {
    /// Every path may be fetched
    AllowAll,
    /// No path may be fetched
    DisallowAll,
    /// Decided by the rules in the file
    Rules(String),
}

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's matcher, plus the two
/// blanket policies a server can imply through its status code alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    policy: Policy,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// Empty or unparseable content allows everything.
    pub fn from_content(content: &str) -> Self {
        Self {
            policy: Policy::Rules(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This applies when the site has no robots.txt.
    pub fn allow_all() -> Self {
        Self {
            policy: Policy::AllowAll,
        }
    }

    /// Creates a ParsedRobots that refuses everything
    ///
    /// This applies when robots.txt is access-restricted or the server errors.
    pub fn disallow_all() -> Self {
        Self {
            policy: Policy::DisallowAll,
        }
    }

    /// Chooses the policy implied by a robots.txt response
    ///
    /// | Status | Policy |
    /// |--------|--------|
    /// | 401, 403 | Disallow all |
    /// | other 4xx | Allow all |
    /// | 5xx | Disallow all |
    /// | anything else | Parse `body` |
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::disallow_all(),
            400..=499 => Self::allow_all(),
            500..=599 => Self::disallow_all(),
            _ => Self::from_content(body),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The full URL (or path) to check
    /// * `user_agent` - The user agent string; `*` matches only the wildcard group
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.policy {
            Policy::AllowAll => true,
            Policy::DisallowAll => false,
            Policy::Rules(content) if content.trim().is_empty() => true,
            Policy::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}
