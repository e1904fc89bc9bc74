//! Error types for Analyst Desk
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Analyst Desk operations
///
/// The first variants form the exchange taxonomy: they describe why a
/// question or its SQL could not be handled, or why a side effect could not
/// be persisted. The remaining variants cover configuration and storage
/// plumbing.
#[derive(Error, Debug)]
pub enum AnalystDeskError {
    /// Input rejected before any network call (blank question, no model, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network-level failure talking to the analyst service (connect, timeout)
    #[error("Transport error: {cause}")]
    Transport {
        /// Human readable cause reported by the HTTP stack
        cause: String,
    },

    /// The analyst service answered with a failure status
    #[error("Analyst service error: {status} - {detail}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Error detail carried in the response body
        detail: String,
    },

    /// Success status but the body could not be parsed into content blocks
    #[error("Malformed analyst response: {0}")]
    MalformedResponse(String),

    /// A generated SQL statement could not be executed
    #[error("SQL execution error: {0}")]
    Query(String),

    /// Audit log or bookmark write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database read errors and stage file access errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AnalystDeskError {
    /// Whether this error aborts only the current exchange and should be shown
    /// to the user as a visible message
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Transport { .. }
                | Self::Service { .. }
                | Self::MalformedResponse(_)
                | Self::Query(_)
        )
    }
}

/// Result type alias for Analyst Desk operations
///
/// Uses `anyhow::Error` so context can be attached while propagating;
/// callers that need the taxonomy use `downcast_ref::<AnalystDeskError>()`.
pub type Result<T> = anyhow::Result<T>;
