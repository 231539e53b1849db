//! Origin state definitions for tracking crawl progress
//!
//! Each origin moves through a fixed pipeline. There is no failure state: a
//! fetch that fails is recorded with the `-1` status and the origin still
//! advances.

use std::fmt;

/// Represents where an origin is in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginState {
    /// Origin has not been fetched yet
    Pending,

    /// Origin homepage was fetched with the given status (`-1` on failure)
    OriginFetched { status: i32 },

    /// Contact pages (if any) were fetched and recorded
    ContactPagesFetched,

    /// Emails were aggregated for this origin
    Aggregated,
}

impl OriginState {
    /// Returns true if the pipeline has finished for this origin
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aggregated)
    }

    /// Returns true if contact-link discovery should run for this origin
    ///
    /// Discovery only happens after a 200 response on the homepage.
    pub fn should_discover(&self) -> bool {
        matches!(self, Self::OriginFetched { status: 200 })
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: &OriginState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::OriginFetched { .. })
                | (Self::OriginFetched { .. }, Self::ContactPagesFetched)
                | (Self::ContactPagesFetched, Self::Aggregated)
        )
    }

    /// Returns the transition target, or the offending pair if it is illegal
    pub fn transition(self, next: OriginState) -> crate::Result<OriginState> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(crate::CrawlerError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::OriginFetched { .. } => "origin_fetched",
            Self::ContactPagesFetched => "contact_pages_fetched",
            Self::Aggregated => "aggregated",
        }
    }
}

impl Default for OriginState {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for OriginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OriginFetched { status } => write!(f, "{}({})", self.name(), status),
            _ => write!(f, "{}", self.name()),
        }
    }
}
