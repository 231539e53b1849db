//! Extraction records and the origin mapping
//!
//! Together these form the crawl state that checkpoints persist. Records are
//! keyed by the exact URL that was fetched; the mapping ties each input row
//! back to the URLs fetched on its behalf.

use crate::crawler::EmailSet;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Emails and status observed for one fetched URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    /// The URL actually fetched
    pub url: String,

    /// Addresses found on the page (empty unless the status was 200)
    pub emails: EmailSet,

    /// HTTP status, or `-1` if the fetch failed
    pub status_code: i32,
}

impl ExtractionRecord {
    pub fn new(url: impl Into<String>, emails: EmailSet, status_code: i32) -> Self {
        Self {
            url: url.into(),
            emails,
            status_code,
        }
    }

    /// Returns true if the fetch produced no HTTP response at all
    pub fn is_failed(&self) -> bool {
        self.status_code < 0
    }
}

/// Origin index to the ordered URLs fetched for it
///
/// The first URL of an entry is the origin itself (or its downgrade),
/// followed by discovered contact pages in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginMapping(BTreeMap<usize, Vec<String>>);

impl OriginMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fetched URL to the entry of `index`
    pub fn push(&mut self, index: usize, url: impl Into<String>) {
        self.0.entry(index).or_default().push(url.into());
    }

    /// Replaces the entry of `index`
    pub fn insert(&mut self, index: usize, urls: Vec<String>) {
        self.0.insert(index, urls);
    }

    pub fn get(&self, index: usize) -> Option<&[String]> {
        self.0.get(&index).map(Vec::as_slice)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Vec<String>> {
        self.0.remove(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, usize, Vec<String>> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<usize, Vec<String>> {
        &self.0
    }
}

impl From<BTreeMap<usize, Vec<String>>> for OriginMapping {
    fn from(map: BTreeMap<usize, Vec<String>>) -> Self {
        Self(map)
    }
}

/// Everything a checkpoint holds: records plus the origin mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    pub records: BTreeMap<String, ExtractionRecord>,
    pub mapping: OriginMapping,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record and appends its URL to the entry of `index`
    ///
    /// A URL fetched twice keeps only its latest record.
    pub fn record(&mut self, index: usize, record: ExtractionRecord) {
        self.mapping.push(index, record.url.clone());
        self.records.insert(record.url.clone(), record);
    }

    pub fn record_for(&self, url: &str) -> Option<&ExtractionRecord> {
        self.records.get(url)
    }

    /// Number of origins with at least one fetched URL
    pub fn origins_processed(&self) -> usize {
        self.mapping.len()
    }

    /// Drops the entry of `index` together with records no other entry uses
    pub fn forget_origin(&mut self, index: usize) {
        let Some(urls) = self.mapping.remove(index) else {
            return;
        };
        for url in urls {
            let shared = self
                .mapping
                .iter()
                .any(|(_, other)| other.iter().any(|u| u == &url));
            if !shared {
                self.records.remove(&url);
            }
        }
    }
}
