//! Conversation types shared by the analyst client and the session layer
//!
//! The wire format of a content block is the Cortex Analyst one: an object
//! tagged by `type` (`text`, `suggestions`, `sql`). The same representation is
//! used for session history and for the audit log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions
    User,
    /// The analyst service
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One structured unit of a reply
///
/// Unknown wire fields (the service also reports e.g. a confidence object next
/// to a SQL statement) are ignored; an unknown `type` fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text, rendered verbatim
    Text {
        /// Text body
        text: String,
    },
    /// Follow-up questions the user may pick from
    Suggestions {
        /// Suggested questions, in display order
        suggestions: Vec<String>,
    },
    /// Generated SQL statement; executed on demand by the renderer, never stored as results
    Sql {
        /// The SQL text
        statement: String,
    },
}

impl ContentBlock {
    /// Creates a text block
    ///
    /// # Examples
    ///
    /// ```
    /// use analyst_desk::analyst::ContentBlock;
    ///
    /// let block = ContentBlock::text("France won 15 medals.");
    /// assert!(matches!(block, ContentBlock::Text { .. }));
    /// ```
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// One conversational turn
///
/// Messages are immutable once appended to a session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the turn
    pub role: Role,
    /// Ordered content of the turn
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Creates a user turn holding a single text block
    ///
    /// # Examples
    ///
    /// ```
    /// use analyst_desk::analyst::{Message, Role};
    ///
    /// let msg = Message::user("How many medals did France win?");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.text(), "How many medals did France win?");
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Creates an assistant turn from the blocks returned by the service
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Concatenation of all text blocks, separated by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All suggestions carried by this turn, in display order
    pub fn suggestions(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Suggestions { suggestions } => Some(suggestions),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    /// SQL statements carried by this turn, in display order
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::Sql { statement } => Some(statement.as_str()),
            _ => None,
        })
    }
}

/// Fully qualified reference to a semantic model file on a stage
///
/// Rendered as `@<database>.<schema>.<stage>/<file>`, the form expected in the
/// `semantic_model_file` request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticModelRef {
    /// Database holding the stage
    pub database: String,
    /// Schema holding the stage
    pub schema: String,
    /// Stage name
    pub stage: String,
    /// File name of the semantic model (yaml)
    pub file: String,
}

impl fmt::Display for SemanticModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{}.{}.{}/{}",
            self.database, self.schema, self.stage, self.file
        )
    }
}
