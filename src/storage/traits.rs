//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::state::CrawlState;
use crate::storage::RunStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Incomplete checkpoint: {0}")]
    Incomplete(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backend implementations
///
/// A checkpoint is always a complete snapshot: `persist` overwrites whatever
/// was there before, and `load` returns the last snapshot written.
pub trait CheckpointStore: Send {
    // ===== Run Management =====

    /// Records the start of a crawl run
    ///
    /// Backends without run tracking ignore this.
    fn begin_run(&mut self, _config_hash: &str) -> StorageResult<()> {
        Ok(())
    }

    /// Records how the current run ended
    fn finish_run(&mut self, _status: RunStatus) -> StorageResult<()> {
        Ok(())
    }

    // ===== Snapshots =====

    /// Overwrites the checkpoint with `state`
    fn persist(&mut self, state: &CrawlState) -> StorageResult<()>;

    /// Reads the last checkpoint back, or `None` if nothing was persisted
    fn load(&self) -> StorageResult<Option<CrawlState>>;

    /// Files this backend writes, for the completion report
    fn artifacts(&self) -> Vec<PathBuf>;
}
