//! Conversation sessions
//!
//! A [`ConversationSession`] is the per-user, per-application state of a
//! conversation. It is only ever changed by the pure handlers in [`events`],
//! which return the next session together with the side effects to perform.
//! The [`controller::AnalystDesk`] executes those effects against the analyst
//! service and the stores, and [`registry::SessionRegistry`] owns the live
//! sessions.

use crate::analyst::Message;
use std::fmt;

pub mod controller;
pub mod events;
pub mod registry;

pub use controller::{AnalystDesk, Notice, TurnOutcome};
pub use events::{AnswerReceived, Effect, Transition};
pub use registry::SessionRegistry;

/// Identity of a session: one application, one user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Application identifier
    pub app_id: i64,
    /// Authenticated user name
    pub username: String,
}

impl SessionKey {
    /// Create a key
    ///
    /// # Examples
    ///
    /// ```
    /// use analyst_desk::session::SessionKey;
    ///
    /// let key = SessionKey::new(3, "alice");
    /// assert_eq!(key.to_string(), "alice@3");
    /// ```
    pub fn new(app_id: i64, username: impl Into<String>) -> Self {
        Self {
            app_id,
            username: username.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.app_id)
    }
}

/// Whether a question is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ready for a new question
    #[default]
    Idle,
    /// A question was sent and its answer has not arrived yet
    AwaitingResponse,
}

/// State of one conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSession {
    key: SessionKey,
    selected_model: Option<String>,
    history: Vec<Message>,
    pending_suggestion: Option<String>,
    phase: Phase,
}

impl ConversationSession {
    /// Fresh session with `model` preselected
    pub fn new(key: SessionKey, model: Option<String>) -> Self {
        Self {
            key,
            selected_model: model,
            history: Vec::new(),
            pending_suggestion: None,
            phase: Phase::Idle,
        }
    }

    /// Session identity
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Logical name of the selected semantic model
    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// Turns exchanged since the model was selected, oldest first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Suggestion clicked but not submitted yet
    pub fn pending_suggestion(&self) -> Option<&str> {
        self.pending_suggestion.as_deref()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recent assistant turn
    pub fn last_reply(&self) -> Option<&Message> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == crate::analyst::Role::Assistant)
    }

    /// SQL statement number `n` (1-based) of the most recent answer
    pub fn statement(&self, n: usize) -> Option<&str> {
        let idx = n.checked_sub(1)?;
        self.last_reply()?.statements().nth(idx)
    }

    /// Most recent question asked
    pub fn last_question(&self) -> Option<String> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == crate::analyst::Role::User)
            .map(Message::text)
    }
}
