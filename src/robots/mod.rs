//! Robots.txt handling module
//!
//! This module decides whether an organization's website may be scraped,
//! one origin at a time or as a bounded parallel batch.

mod batch;
mod checker;
mod parser;

pub use batch::{BatchChecker, ScrapeStatus};
pub use checker::{ScrapabilityChecker, ScrapeDecision, SkipReason};
pub use parser::ParsedRobots;
