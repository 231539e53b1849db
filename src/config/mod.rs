//! Configuration module for the email crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so running without a config file is the same as
//! running with an empty one.
//!
//! # Example
//!
//! ```no_run
//! use email_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Checkpoint every {} origins", config.checkpoint.interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckpointBackend, CheckpointConfig, Config, FilterConfig, HttpConfig, RetryConfig,
    ScrapabilityConfig, DEFAULT_DENYLIST,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
