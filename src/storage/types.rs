use crate::analyst::SemanticModelRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic model registered for an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticModel {
    /// Logical name shown in the model selector
    pub name: String,
    /// File name on the application's stage
    pub file: String,
}

/// One row of the configuration store, with its active models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identifier
    pub app_id: i64,
    /// Display name, also recorded in the audit log
    pub name: String,
    /// Target database of the semantic model stage
    pub database: String,
    /// Target schema of the semantic model stage
    pub schema: String,
    /// Stage holding the semantic model files
    pub stage: String,
    /// Fully qualified stage path of the launcher logo
    pub logo: Option<String>,
    /// Active semantic models in registration order
    pub models: Vec<SemanticModel>,
}

impl AppConfig {
    /// The model selected when a session starts
    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(|m| m.name.as_str())
    }

    /// Whether `name` is one of the active models
    pub fn has_model(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    /// Resolve a logical model name to its file name
    pub fn model_file(&self, name: &str) -> Option<&str> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.file.as_str())
    }

    /// Resolve a logical model name to a fully qualified model reference
    pub fn model_ref(&self, name: &str) -> Option<SemanticModelRef> {
        self.model_file(name).map(|file| SemanticModelRef {
            database: self.database.clone(),
            schema: self.schema.clone(),
            stage: self.stage.clone(),
            file: file.to_string(),
        })
    }
}

/// Audit row for one completed exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the exchange completed
    pub timestamp: DateTime<Utc>,
    /// Who asked
    pub username: String,
    /// Application identifier
    pub app_id: i64,
    /// Application display name
    pub app_name: String,
    /// Semantic model file used
    pub model_file: String,
    /// The question as submitted
    pub input_text: String,
    /// Serialized service response
    pub output_json: String,
    /// Request latency in milliseconds
    pub elapsed_ms: u64,
}

/// Saved question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    /// Application the question belongs to
    pub app_id: i64,
    /// Who saved it
    pub username: String,
    /// Question text
    pub question: String,
    /// Language tag chosen at save time
    pub language: String,
    /// When it was saved
    pub created_at: DateTime<Utc>,
}
