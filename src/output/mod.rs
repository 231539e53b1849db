//! Output module for crawl summaries
//!
//! This module handles recording and printing run statistics. The tables
//! themselves are written by the `table` module.

pub mod stats;

pub use stats::{
    print_scrapability_summary, print_statistics, scrapability_counts, CrawlStatistics,
};
