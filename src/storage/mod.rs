//! SQLite-backed configuration store, audit log, and bookmark store
//!
//! A single database file holds four tables: `cortex_apps` and
//! `cortex_models` (configuration store), `cortex_logs` (audit trail), and
//! `cortex_bookmarks`. Every operation opens a short-lived connection and
//! writes at most one logical row, so no locking discipline is needed beyond
//! SQLite's own.

use crate::error::{AnalystDeskError, Result};
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub mod audit;
pub mod bookmarks;
pub mod catalog;
pub mod stage;
pub mod types;

pub use audit::AuditSink;
pub use catalog::{AppCatalogFile, AppDefinition, ModelDefinition};
pub use stage::{LocalStage, StagePath, StageReader};
pub use types::{AppConfig, BookmarkEntry, LogEntry, SemanticModel};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cortex_apps (
    app_id INTEGER PRIMARY KEY,
    app_name TEXT NOT NULL,
    app_database TEXT NOT NULL,
    app_schema TEXT NOT NULL,
    app_stage TEXT NOT NULL,
    app_logo TEXT
);
CREATE TABLE IF NOT EXISTS cortex_models (
    app_id INTEGER NOT NULL REFERENCES cortex_apps(app_id),
    model_name TEXT NOT NULL,
    model_file TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (app_id, model_name)
);
CREATE TABLE IF NOT EXISTS cortex_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at TEXT NOT NULL,
    username TEXT NOT NULL,
    app_id INTEGER NOT NULL,
    app_name TEXT NOT NULL,
    model_file TEXT NOT NULL,
    input_text TEXT NOT NULL,
    output_json TEXT NOT NULL,
    elapsed_ms INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cortex_logs_app ON cortex_logs (app_id, input_text);
CREATE TABLE IF NOT EXISTS cortex_bookmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id INTEGER NOT NULL,
    username TEXT NOT NULL,
    question TEXT NOT NULL,
    language TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cortex_bookmarks_app ON cortex_bookmarks (app_id, created_at);
";

/// Storage backend shared by the catalog, audit log, and bookmarks
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        Self::new_with_path(Self::default_db_path()?)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use analyst_desk::storage::SqliteStorage;
    ///
    /// let dir = std::env::temp_dir().join("analyst-desk-doc");
    /// let storage = SqliteStorage::new_with_path(dir.join("desk.db")).unwrap();
    /// assert!(storage.list_applications().is_ok());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open storage at the configured path, or the default location
    pub fn open(db_path: Option<&Path>) -> Result<Self> {
        match db_path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Default database location in the platform data directory
    pub fn default_db_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("desk.db"))
    }

    /// Path of the underlying database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create tables")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;
        tracing::debug!("Storage initialized at {}", self.db_path.display());
        Ok(())
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;
        Ok(conn)
    }
}

/// Platform data directory for the desk
pub fn data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "analyst-desk", "analyst-desk")
        .ok_or_else(|| AnalystDeskError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// Fixed-width RFC 3339 timestamp, so text ordering matches time ordering
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp read from column `idx`
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Temporary storage; keep the `TempDir` alive for the test's duration
    pub fn create_test_storage() -> (SqliteStorage, TempDir) {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let storage =
            SqliteStorage::new_with_path(dir.path().join("desk.db")).expect("failed to create storage");
        (storage, dir)
    }
}
