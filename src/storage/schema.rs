//! Database schema definitions
//!
//! This module contains the SQL schema of the SQLite checkpoint database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Every fetched URL
CREATE TABLE IF NOT EXISTS extraction_records (
    url TEXT PRIMARY KEY,
    checkpointed_at TEXT NOT NULL
);

-- Emails found per URL
CREATE TABLE IF NOT EXISTS record_emails (
    url TEXT NOT NULL REFERENCES extraction_records(url) ON DELETE CASCADE,
    email TEXT NOT NULL,
    PRIMARY KEY (url, email)
);

-- HTTP status per URL, -1 when no response was received
CREATE TABLE IF NOT EXISTS status_codes (
    url TEXT PRIMARY KEY REFERENCES extraction_records(url) ON DELETE CASCADE,
    status_code INTEGER NOT NULL
);

-- Ordered URLs fetched on behalf of each input origin
CREATE TABLE IF NOT EXISTS origin_pages (
    origin_index INTEGER NOT NULL,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    PRIMARY KEY (origin_index, position)
);

CREATE INDEX IF NOT EXISTS idx_origin_pages_url ON origin_pages(url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
