//! URL handling module
//!
//! This module provides origin normalization, the HTTPS-to-HTTP downgrade used
//! after TLS failures, site-base resolution for contact links, and domain
//! extraction for reporting.

mod domain;
mod normalize;

use crate::UrlResult;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use normalize::{downgrade_to_http, normalize_origin, robots_url, site_base};

/// One input organization website
///
/// Identity is the normalized URL string. Origins are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    url: Url,
    scrapable: bool,
}

impl Origin {
    /// Creates an origin from an already-normalized URL
    pub fn new(url: Url, scrapable: bool) -> Self {
        Self { url, scrapable }
    }

    /// Normalizes a raw website cell into an origin
    ///
    /// # Examples
    ///
    /// ```
    /// use email_crawler::url::Origin;
    ///
    /// let origin = Origin::parse("acme.org", true).unwrap();
    /// assert_eq!(origin.as_str(), "https://acme.org/");
    /// assert!(origin.is_scrapable());
    /// ```
    pub fn parse(raw: &str, scrapable: bool) -> UrlResult<Self> {
        Ok(Self::new(normalize_origin(raw)?, scrapable))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn is_scrapable(&self) -> bool {
        self.scrapable
    }

    /// Returns the display domain of this origin
    pub fn domain(&self) -> String {
        extract_domain(&self.url).unwrap_or_else(|| self.url.to_string())
    }

    /// Returns true if `url` is this origin or its `http://` downgrade
    pub fn matches_fetched(&self, url: &str) -> bool {
        url == self.as_str()
            || downgrade_to_http(&self.url).map_or(false, |http| http.as_str() == url)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
