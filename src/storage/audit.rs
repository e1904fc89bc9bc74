//! Append-only audit trail of answered questions

use super::types::LogEntry;
use super::{format_timestamp, SqliteStorage};
use crate::error::{AnalystDeskError, Result};
use anyhow::Context;
use rusqlite::params;

/// Destination of audit rows
///
/// A failed write is reported to the caller, who decides how loudly to
/// surface it; it never undoes the exchange being recorded.
pub trait AuditSink: Send + Sync {
    /// Append one row for a completed exchange
    fn record(&self, entry: &LogEntry) -> Result<()>;
}

impl AuditSink for SqliteStorage {
    fn record(&self, entry: &LogEntry) -> Result<()> {
        let conn = self
            .connect()
            .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

        conn.execute(
            "INSERT INTO cortex_logs
                (logged_at, username, app_id, app_name, model_file, input_text, output_json, elapsed_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                format_timestamp(&entry.timestamp),
                entry.username,
                entry.app_id,
                entry.app_name,
                entry.model_file,
                entry.input_text,
                entry.output_json,
                i64::try_from(entry.elapsed_ms).unwrap_or(i64::MAX),
            ],
        )
        .context("Failed to insert audit row")
        .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

        tracing::debug!(
            "Recorded exchange for {} on app {} ({} ms)",
            entry.username,
            entry.app_id,
            entry.elapsed_ms
        );
        Ok(())
    }
}

impl SqliteStorage {
    /// Most frequently asked questions for an application
    ///
    /// Ordered by descending count, ties broken alphabetically.
    pub fn top_questions(&self, app_id: i64, limit: usize) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT input_text, COUNT(*) AS asked FROM cortex_logs
                WHERE app_id = ?
                GROUP BY input_text
                ORDER BY asked DESC, input_text ASC
                LIMIT ?",
            )
            .context("Failed to prepare statement")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        let questions = stmt
            .query_map(params![app_id, limit as i64], |row| row.get::<_, String>(0))
            .context("Failed to query audit log")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        Ok(questions)
    }

    /// Number of audit rows recorded for an application
    pub fn log_count(&self, app_id: i64) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM cortex_logs WHERE app_id = ?",
                params![app_id],
                |row| row.get(0),
            )
            .context("Failed to count audit rows")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;
        Ok(count as usize)
    }

    /// Audit rows for an application, oldest first
    pub fn log_entries(&self, app_id: i64) -> Result<Vec<LogEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT logged_at, username, app_id, app_name, model_file, input_text, output_json, elapsed_ms
                FROM cortex_logs WHERE app_id = ? ORDER BY id",
            )
            .context("Failed to prepare statement")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        let entries = stmt
            .query_map(params![app_id], |row| {
                let logged_at: String = row.get(0)?;
                let elapsed: i64 = row.get(7)?;
                Ok(LogEntry {
                    timestamp: super::parse_timestamp(0, &logged_at)?,
                    username: row.get(1)?,
                    app_id: row.get(2)?,
                    app_name: row.get(3)?,
                    model_file: row.get(4)?,
                    input_text: row.get(5)?,
                    output_json: row.get(6)?,
                    elapsed_ms: u64::try_from(elapsed).unwrap_or(0),
                })
            })
            .context("Failed to query audit log")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        Ok(entries)
    }
}
