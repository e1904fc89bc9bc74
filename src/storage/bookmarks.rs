//! Saved questions, shared across users of an application

use super::types::BookmarkEntry;
use super::{format_timestamp, parse_timestamp, SqliteStorage};
use crate::error::{AnalystDeskError, Result};
use anyhow::Context;
use chrono::Utc;
use rusqlite::params;

impl SqliteStorage {
    /// Append a bookmark
    ///
    /// Saving the same question twice stores two rows.
    pub fn save_bookmark(
        &self,
        app_id: i64,
        username: &str,
        question: &str,
        language: &str,
    ) -> Result<BookmarkEntry> {
        let entry = BookmarkEntry {
            app_id,
            username: username.to_string(),
            question: question.to_string(),
            language: language.to_string(),
            created_at: Utc::now(),
        };

        let conn = self
            .connect()
            .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

        conn.execute(
            "INSERT INTO cortex_bookmarks (app_id, username, question, language, created_at)
            VALUES (?, ?, ?, ?, ?)",
            params![
                entry.app_id,
                entry.username,
                entry.question,
                entry.language,
                format_timestamp(&entry.created_at)
            ],
        )
        .context("Failed to insert bookmark")
        .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

        tracing::info!("Bookmark added for user {}: {}", username, question);
        Ok(entry)
    }

    /// Bookmarks of an application from every user, newest first
    pub fn recent_bookmarks(&self, app_id: i64, limit: usize) -> Result<Vec<BookmarkEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT app_id, username, question, language, created_at
                FROM cortex_bookmarks
                WHERE app_id = ?
                ORDER BY created_at DESC, id DESC
                LIMIT ?",
            )
            .context("Failed to prepare statement")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        let bookmarks = stmt
            .query_map(params![app_id, limit as i64], |row| {
                let created_at: String = row.get(4)?;
                Ok(BookmarkEntry {
                    app_id: row.get(0)?,
                    username: row.get(1)?,
                    question: row.get(2)?,
                    language: row.get(3)?,
                    created_at: parse_timestamp(4, &created_at)?,
                })
            })
            .context("Failed to query bookmarks")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        Ok(bookmarks)
    }
}
