//! Storage module for persisting crawl checkpoints
//!
//! This module handles durable snapshots of the crawl state:
//! - SQLite database with run tracking (default)
//! - Flat JSON files compatible with older tooling
//! - Loading a snapshot back for resume and merge

mod json;
mod schema;
mod sqlite;
mod traits;

pub use json::{JsonCheckpoint, CODES_FILE, MAPPING_FILE, RESULTS_FILE};
pub use sqlite::SqliteCheckpoint;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::config::{CheckpointBackend, CheckpointConfig};

/// Opens the checkpoint backend selected in `config`
///
/// The checkpoint directory is created if it does not exist.
pub fn open_checkpoint(config: &CheckpointConfig) -> StorageResult<Box<dyn CheckpointStore>> {
    std::fs::create_dir_all(config.directory())?;
    match config.backend {
        CheckpointBackend::Sqlite => Ok(Box::new(SqliteCheckpoint::new(&config.database_path())?)),
        CheckpointBackend::Json => Ok(Box::new(JsonCheckpoint::new(config.directory())?)),
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
