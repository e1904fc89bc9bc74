//! Live sessions, one per application and user

use super::{ConversationSession, SessionKey};
use std::collections::HashMap;

/// Owner of all live sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionKey, ConversationSession>,
}

impl SessionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `key`, created with `default_model` selected on first use
    pub fn get_or_create(
        &mut self,
        key: &SessionKey,
        default_model: Option<&str>,
    ) -> &ConversationSession {
        self.sessions.entry(key.clone()).or_insert_with(|| {
            tracing::debug!("Starting session {}", key);
            ConversationSession::new(key.clone(), default_model.map(str::to_string))
        })
    }

    /// Existing session for `key`
    pub fn get(&self, key: &SessionKey) -> Option<&ConversationSession> {
        self.sessions.get(key)
    }

    /// Store the next state of a session
    pub fn put(&mut self, session: ConversationSession) {
        self.sessions.insert(session.key().clone(), session);
    }

    /// End a session; the next interaction starts over
    pub fn reset(&mut self, key: &SessionKey) -> Option<ConversationSession> {
        self.sessions.remove(key)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
