//! "Frequently asked" shortcuts shown before a conversation starts
//!
//! Bookmarks saved by any user of the application come first. When an
//! application has none yet, the most frequently asked questions from the
//! audit log stand in, two fewer than the bookmark limit. Results are cached
//! per application and user for the configured time-to-live; new bookmarks
//! show up once the cached list expires.

use crate::cache::TtlCache;
use crate::config::QuickQuestionsConfig;
use crate::error::Result;
use crate::session::SessionKey;
use crate::storage::SqliteStorage;
use std::time::Duration;

/// Number of log-derived questions shown when no bookmark exists
pub fn fallback_limit(limit: usize) -> usize {
    limit.saturating_sub(2)
}

/// Cached provider of quick questions
pub struct QuickQuestions {
    storage: SqliteStorage,
    cache: TtlCache<SessionKey, Vec<String>>,
}

impl QuickQuestions {
    /// Create a provider whose results live for `ttl`
    pub fn new(storage: SqliteStorage, ttl: Duration) -> Self {
        Self {
            storage,
            cache: TtlCache::new(ttl),
        }
    }

    /// Create a provider from configuration
    pub fn from_config(storage: SqliteStorage, config: &QuickQuestionsConfig) -> Self {
        Self::new(storage, Duration::from_secs(config.ttl_seconds))
    }

    /// Quick questions for `key`, at most `limit` of them
    pub fn recent_questions(&mut self, key: &SessionKey, limit: usize) -> Result<Vec<String>> {
        if let Some((questions, expires_at)) = self.cache.get(key) {
            tracing::debug!(
                "Quick questions for {} served from cache (expires in {:?})",
                key,
                expires_at.saturating_duration_since(std::time::Instant::now())
            );
            return Ok(questions);
        }

        let bookmarks = self.storage.recent_bookmarks(key.app_id, limit)?;
        let questions = if bookmarks.is_empty() {
            tracing::debug!("No bookmarks for app {}, using audit log", key.app_id);
            self.storage
                .top_questions(key.app_id, fallback_limit(limit))?
        } else {
            bookmarks.into_iter().map(|b| b.question).collect()
        };

        self.cache.insert(key.clone(), questions.clone());
        Ok(questions)
    }
}
