//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `OriginState`: Where an origin is in the fetch, discover, aggregate pipeline
//! - `ExtractionRecord`: Emails and status observed for one fetched URL
//! - `OriginMapping`: Which URLs were fetched on behalf of each origin
//! - `CrawlState`: Records plus mapping, the unit a checkpoint persists

mod origin_state;
mod records;

// Re-export main types
pub use origin_state::OriginState;
pub use records::{CrawlState, ExtractionRecord, OriginMapping};
