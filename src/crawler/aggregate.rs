//! Per-origin email aggregation
//!
//! Aggregates are never stored; they are recomputed from the records and the
//! origin mapping whenever they are needed, so a loaded checkpoint produces
//! exactly what the original run would have.

use crate::crawler::EmailSet;
use crate::state::CrawlState;
use std::collections::BTreeMap;

/// Origin index to its filtered email set
pub type AggregatedEmails = BTreeMap<usize, EmailSet>;

/// Unions the emails of every URL mapped to an origin and drops denylisted
/// addresses
///
/// URLs in the mapping without a record contribute nothing.
pub fn aggregate(state: &CrawlState, denylist: &[String]) -> AggregatedEmails {
    state
        .mapping
        .iter()
        .map(|(&index, urls)| {
            let mut emails = EmailSet::new();
            for url in urls {
                if let Some(record) = state.record_for(url) {
                    emails.merge(&record.emails);
                }
            }
            (index, emails.without_denied(denylist))
        })
        .collect()
}
