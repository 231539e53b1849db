//! Contact link discovery
//!
//! Finds the anchors on a homepage that look like contact or about pages and
//! resolves them to absolute URLs. Only one hop is ever followed, so nothing
//! here deduplicates or filters by host.

use crate::url::site_base;
use scraper::{Html, Selector};
use url::Url;

/// Substrings an href must contain to be followed
const CONTACT_MARKERS: &[&str] = &["contact", "about"];

/// Discovers contact and about links on an origin's homepage
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactLinkDiscoverer;

impl ContactLinkDiscoverer {
    pub fn new() -> Self {
        Self
    }

    /// Returns the contact links of `html`, resolved against the origin's
    /// `scheme://host[:port]/` base
    ///
    /// # Link Rules
    ///
    /// - Every `<a href>` is considered, regardless of rel or download attributes
    /// - The raw href must contain `contact` or `about` (case-sensitive)
    /// - Document order is kept and duplicates are not removed
    /// - Hrefs that do not resolve to a URL are dropped
    ///
    /// # Example
    ///
    /// ```
    /// use email_crawler::crawler::ContactLinkDiscoverer;
    /// use url::Url;
    ///
    /// let origin = Url::parse("https://acme.com/").unwrap();
    /// let html = r#"<a href="/contact-us">Contact</a><a href="/team">Team</a>"#;
    /// let links = ContactLinkDiscoverer::new().discover(&origin, html);
    /// assert_eq!(links[0].as_str(), "https://acme.com/contact-us");
    /// ```
    pub fn discover(&self, origin: &Url, html: &str) -> Vec<Url> {
        let document = Html::parse_document(html);
        let base = site_base(origin);

        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter(|href| is_contact_href(href))
            .filter_map(|href| match base.join(href) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("Skipping unresolvable link {:?}: {}", href, e);
                    None
                }
            })
            .collect()
    }
}

fn is_contact_href(href: &str) -> bool {
    CONTACT_MARKERS.iter().any(|marker| href.contains(marker))
}
