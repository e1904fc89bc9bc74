//! Pure session event handlers
//!
//! Each handler takes the current session and an event payload and returns
//! the next session plus the effects the caller must perform. Handlers never
//! do I/O; a rejected event leaves the caller's session untouched.

use super::{ConversationSession, Phase};
use crate::analyst::{AnalystReply, ContentBlock, Message};
use crate::error::{AnalystDeskError, Result};
use crate::storage::LogEntry;
use chrono::{DateTime, Utc};

/// Side effect requested by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the question to the analyst service against `model_file`
    AskAnalyst {
        /// Question text
        question: String,
        /// Semantic model file on the application stage
        model_file: String,
    },
    /// Append an audit row
    RecordExchange(LogEntry),
}

/// Next session and the effects to perform
#[derive(Debug, Clone)]
pub struct Transition {
    /// Session after the event
    pub session: ConversationSession,
    /// Effects, in execution order
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(session: ConversationSession) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }
}

/// Details of a successful answer
#[derive(Debug, Clone)]
pub struct AnswerReceived<'a> {
    /// Question that was asked
    pub question: &'a str,
    /// Application display name for the audit row
    pub app_name: &'a str,
    /// Semantic model file the question was asked against
    pub model_file: &'a str,
    /// Parsed reply
    pub reply: &'a AnalystReply,
    /// Request latency
    pub elapsed_ms: u64,
    /// When the answer arrived
    pub completed_at: DateTime<Utc>,
}

/// Select a semantic model
///
/// Changing to a different model starts the conversation over; reselecting
/// the current one keeps it.
pub fn on_model_selected(session: &ConversationSession, model: &str) -> Transition {
    let mut next = session.clone();
    if next.selected_model.as_deref() != Some(model) {
        next.history.clear();
        next.pending_suggestion = None;
        next.selected_model = Some(model.to_string());
    }
    Transition::quiet(next)
}

/// Submit a question
///
/// `resolve_model_file` maps the selected logical model name to its file.
/// The text is kept as submitted; only a blank question is rejected.
pub fn on_question_submitted<F>(
    session: &ConversationSession,
    text: &str,
    resolve_model_file: F,
) -> Result<Transition>
where
    F: Fn(&str) -> Option<String>,
{
    if text.trim().is_empty() {
        return Err(AnalystDeskError::Validation("Question must not be empty".into()).into());
    }
    if session.phase == Phase::AwaitingResponse {
        return Err(AnalystDeskError::Validation(
            "A question is already awaiting a response".into(),
        )
        .into());
    }
    let model = session
        .selected_model
        .as_deref()
        .ok_or_else(|| AnalystDeskError::Validation("No semantic model selected".into()))?;
    let model_file = resolve_model_file(model).ok_or_else(|| {
        AnalystDeskError::Validation(format!("Semantic model {} is not available", model))
    })?;

    let mut next = session.clone();
    next.history.push(Message::user(text));
    next.phase = Phase::AwaitingResponse;

    Ok(Transition {
        session: next,
        effects: vec![Effect::AskAnalyst {
            question: text.to_string(),
            model_file,
        }],
    })
}

/// Remember a clicked suggestion for submission
///
/// Only suggestions offered by an earlier assistant turn are accepted.
pub fn on_suggestion_clicked(session: &ConversationSession, text: &str) -> Result<Transition> {
    let offered = session
        .history
        .iter()
        .any(|message| message.suggestions().any(|s| s == text));
    if !offered {
        return Err(AnalystDeskError::Validation(format!(
            "\"{}\" is not one of the offered suggestions",
            text
        ))
        .into());
    }

    let mut next = session.clone();
    next.pending_suggestion = Some(text.to_string());
    Ok(Transition::quiet(next))
}

/// Consume the pending suggestion, if any
pub fn take_pending_suggestion(session: &ConversationSession) -> (Transition, Option<String>) {
    let mut next = session.clone();
    let pending = next.pending_suggestion.take();
    (Transition::quiet(next), pending)
}

/// Record a successful answer
pub fn on_answer_received(session: &ConversationSession, answer: AnswerReceived<'_>) -> Transition {
    let mut next = session.clone();
    let content: Vec<ContentBlock> = answer.reply.content.clone();
    next.history.push(Message::assistant(content));
    next.phase = Phase::Idle;

    let entry = LogEntry {
        timestamp: answer.completed_at,
        username: session.key.username.clone(),
        app_id: session.key.app_id,
        app_name: answer.app_name.to_string(),
        model_file: answer.model_file.to_string(),
        input_text: answer.question.to_string(),
        output_json: answer.reply.raw.to_string(),
        elapsed_ms: answer.elapsed_ms,
    };

    Transition {
        session: next,
        effects: vec![Effect::RecordExchange(entry)],
    }
}

/// Give up on the in-flight question; the question stays in history
pub fn on_answer_failed(session: &ConversationSession) -> Transition {
    let mut next = session.clone();
    next.phase = Phase::Idle;
    Transition::quiet(next)
}
