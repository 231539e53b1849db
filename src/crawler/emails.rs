//! Email address extraction from page text
//!
//! Addresses are matched in text and comment nodes only, so `mailto:` hrefs
//! and other attribute values never contribute. Each node is scanned on its
//! own, which keeps a match from spanning two adjacent elements.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern is valid");
}

/// A set of email addresses
///
/// Membership is exact and case-sensitive: `Info@acme.org` and
/// `info@acme.org` are two entries. Iteration is in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailSet(BTreeSet<String>);

impl EmailSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address, returning false if it was already present
    pub fn insert(&mut self, email: impl Into<String>) -> bool {
        self.0.insert(email.into())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(email)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Adds every address of `other` to this set
    pub fn merge(&mut self, other: &EmailSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Returns a copy without any address containing a denylisted substring
    pub fn without_denied(&self, denylist: &[String]) -> EmailSet {
        self.0
            .iter()
            .filter(|email| !is_denied(email, denylist))
            .cloned()
            .collect()
    }

    /// Joins the addresses with `separator` in sorted order
    pub fn join(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl FromIterator<String> for EmailSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<String> for EmailSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for EmailSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EmailSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Returns true if `email` contains any denylisted substring
pub fn is_denied(email: &str, denylist: &[String]) -> bool {
    denylist.iter().any(|entry| email.contains(entry.as_str()))
}

/// Extracts email addresses from HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts every address found in the text and comments of `html`
    ///
    /// Malformed markup is handled by the HTML parser's error recovery, so
    /// this never fails; the worst case is an empty set.
    ///
    /// # Examples
    ///
    /// ```
    /// use email_crawler::EmailExtractor;
    ///
    /// let html = r#"<p>Write to <b>info@acme.org</b></p><a href="mailto:x@y.org">mail</a>"#;
    /// let emails = EmailExtractor::new().extract(html);
    /// assert!(emails.contains("info@acme.org"));
    /// assert!(!emails.contains("x@y.org"));
    /// ```
    pub fn extract(&self, html: &str) -> EmailSet {
        let document = Html::parse_document(html);
        let mut emails = EmailSet::new();

        for node in document.tree.root().descendants() {
            let text: &str = match node.value() {
                Node::Text(text) => &**text,
                Node::Comment(comment) => &**comment,
                _ => continue,
            };
            emails.extend(extract_from_text(text));
        }

        emails
    }
}

/// Applies the email pattern to one piece of text
fn extract_from_text(text: &str) -> impl Iterator<Item = String> + '_ {
    EMAIL_PATTERN.find_iter(text).map(|m| m.as_str().to_string())
}
