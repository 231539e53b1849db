//! SQLite checkpoint implementation
//!
//! This module provides a SQLite-based implementation of the CheckpointStore
//! trait. Each persist replaces the snapshot tables inside one transaction,
//! so a reader never sees half of a checkpoint.

use crate::crawler::{EmailSet, FAILED_STATUS};
use crate::state::{CrawlState, ExtractionRecord, OriginMapping};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// SQLite checkpoint backend
pub struct SqliteCheckpoint {
    conn: Connection,
    path: PathBuf,
    run_id: Option<i64>,
}

impl SqliteCheckpoint {
    /// Opens or creates the checkpoint database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            run_id: None,
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
            run_id: None,
        })
    }

    /// Gets the most recent run
    pub fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        let run = stmt
            .query_row([], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                        .unwrap_or(RunStatus::Running),
                })
            })
            .optional()?;

        Ok(run)
    }

    fn load_records(&self) -> StorageResult<BTreeMap<String, ExtractionRecord>> {
        let mut records = BTreeMap::new();

        let mut stmt = self.conn.prepare(
            "SELECT r.url, s.status_code FROM extraction_records r
             LEFT JOIN status_codes s ON s.url = r.url",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<i32>>(1)?))
        })?;
        for row in rows {
            let (url, status) = row?;
            let record =
                ExtractionRecord::new(url.clone(), EmailSet::new(), status.unwrap_or(FAILED_STATUS));
            records.insert(url, record);
        }

        let mut stmt = self.conn.prepare("SELECT url, email FROM record_emails")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (url, email) = row?;
            match records.get_mut(&url) {
                Some(record) => {
                    record.emails.insert(email);
                }
                None => {
                    return Err(StorageError::Incomplete(format!(
                        "emails stored for unknown URL {}",
                        url
                    )))
                }
            }
        }

        Ok(records)
    }

    fn load_mapping(&self) -> StorageResult<OriginMapping> {
        let mut mapping = OriginMapping::new();

        let mut stmt = self.conn.prepare(
            "SELECT origin_index, url FROM origin_pages ORDER BY origin_index, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (index, url) = row?;
            let index = usize::try_from(index).map_err(|_| {
                StorageError::Database(format!("negative origin index {}", index))
            })?;
            mapping.push(index, url);
        }

        Ok(mapping)
    }
}

impl CheckpointStore for SqliteCheckpoint {
    // ===== Run Management =====

    fn begin_run(&mut self, config_hash: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        self.run_id = Some(self.conn.last_insert_rowid());
        Ok(())
    }

    fn finish_run(&mut self, status: RunStatus) -> StorageResult<()> {
        let Some(run_id) = self.run_id else {
            return Ok(());
        };
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        Ok(())
    }

    // ===== Snapshots =====

    fn persist(&mut self, state: &CrawlState) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            "
            DELETE FROM record_emails;
            DELETE FROM status_codes;
            DELETE FROM origin_pages;
            DELETE FROM extraction_records;
        ",
        )?;

        {
            let mut insert_record = tx.prepare(
                "INSERT INTO extraction_records (url, checkpointed_at) VALUES (?1, ?2)",
            )?;
            let mut insert_status =
                tx.prepare("INSERT INTO status_codes (url, status_code) VALUES (?1, ?2)")?;
            let mut insert_email =
                tx.prepare("INSERT INTO record_emails (url, email) VALUES (?1, ?2)")?;

            for record in state.records.values() {
                insert_record.execute(params![record.url, now])?;
                insert_status.execute(params![record.url, record.status_code])?;
                for email in &record.emails {
                    insert_email.execute(params![record.url, email])?;
                }
            }

            let mut insert_page = tx.prepare(
                "INSERT INTO origin_pages (origin_index, position, url) VALUES (?1, ?2, ?3)",
            )?;
            for (index, urls) in state.mapping.iter() {
                for (position, url) in urls.iter().enumerate() {
                    insert_page.execute(params![*index as i64, position as i64, url])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<CrawlState>> {
        let records = self.load_records()?;
        let mapping = self.load_mapping()?;

        if records.is_empty() && mapping.is_empty() {
            return Ok(None);
        }

        Ok(Some(CrawlState { records, mapping }))
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }
}
