//! Cortex Analyst HTTP client
//!
//! Sends one user question together with a semantic model reference to the
//! analyst message endpoint and turns the answer into content blocks. A
//! request is attempted exactly once, bounded by the configured timeout.

use crate::analyst::types::{ContentBlock, SemanticModelRef};
use crate::config::AnalystConfig;
use crate::error::{AnalystDeskError, Result};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub(crate) const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Parsed successful answer
#[derive(Debug, Clone)]
pub struct AnalystReply {
    /// Content blocks of the assistant turn, in order
    pub content: Vec<ContentBlock>,
    /// Request identifier assigned by the service, when reported
    pub request_id: Option<String>,
    /// Warning messages attached to the answer
    pub warnings: Vec<String>,
    /// The whole response body, kept for the audit log
    pub raw: serde_json::Value,
}

/// Result of one question, with its latency
///
/// `elapsed_ms` is always populated, whatever the outcome.
#[derive(Debug)]
pub struct AnalystExchange {
    /// Wall-clock time spent on the request, in whole milliseconds
    pub elapsed_ms: u64,
    /// Reply or the classified failure
    pub outcome: std::result::Result<AnalystReply, AnalystDeskError>,
}

/// Question-answering backend
///
/// Implemented by [`CortexAnalystClient`]; tests drive the session layer with
/// scripted implementations.
#[async_trait]
pub trait Analyst: Send + Sync {
    /// Ask a single question against a semantic model
    async fn ask(&self, question: &str, model: &SemanticModelRef) -> AnalystExchange;
}

/// Request body for the message endpoint
#[derive(Debug, Serialize)]
struct AnalystRequest<'a> {
    messages: Vec<RequestMessage<'a>>,
    semantic_model_file: String,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    r#type: &'static str,
    text: &'a str,
}

impl<'a> AnalystRequest<'a> {
    fn single_turn(question: &'a str, model: &SemanticModelRef) -> Self {
        Self {
            messages: vec![RequestMessage {
                role: "user",
                content: vec![RequestContent {
                    r#type: "text",
                    text: question,
                }],
            }],
            semantic_model_file: model.to_string(),
        }
    }
}

/// Response body from the message endpoint
#[derive(Debug, Deserialize)]
struct AnalystResponse {
    message: ResponseMessage,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    warnings: Vec<ResponseWarning>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseWarning {
    #[serde(default)]
    message: String,
}

/// Client for `POST /api/v2/cortex/analyst/message`
///
/// # Examples
///
/// ```no_run
/// use analyst_desk::analyst::{Analyst, CortexAnalystClient, SemanticModelRef};
/// use analyst_desk::config::AnalystConfig;
///
/// # async fn example() -> analyst_desk::error::Result<()> {
/// let client = CortexAnalystClient::new(&AnalystConfig::default())?;
/// let model = SemanticModelRef {
///     database: "CORTEX_ANALYST_DEMO".into(),
///     schema: "WINTER_GAME".into(),
///     stage: "RAW_DATA".into(),
///     file: "winter_game.yaml".into(),
/// };
/// let exchange = client.ask("How many medals did France win?", &model).await;
/// println!("took {} ms", exchange.elapsed_ms);
/// # Ok(())
/// # }
/// ```
pub struct CortexAnalystClient {
    client: Client,
    endpoint: String,
    timeout_ms: u64,
    token: Option<String>,
    token_type: Option<String>,
}

impl CortexAnalystClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &AnalystConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("analyst-desk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalystDeskError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint_path
        );

        tracing::info!(
            "Initialized analyst client: endpoint={}, timeout_ms={}",
            endpoint,
            config.timeout_ms
        );

        Ok(Self {
            client,
            endpoint,
            timeout_ms: config.timeout_ms,
            token: config.token.clone(),
            token_type: config.token_type.clone(),
        })
    }

    /// Full URL questions are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(
        &self,
        request: &AnalystRequest<'_>,
    ) -> std::result::Result<AnalystReply, AnalystDeskError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(token_type) = &self.token_type {
            builder = builder.header(TOKEN_TYPE_HEADER, token_type);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status.as_u16() >= 400 {
            let detail = service_detail(&body);
            tracing::error!("Analyst service returned error {}: {}", status, detail);
            return Err(AnalystDeskError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        parse_reply(&body)
    }

    fn transport_error(&self, error: reqwest::Error) -> AnalystDeskError {
        let cause = if error.is_timeout() {
            format!("request timed out after {} ms", self.timeout_ms)
        } else {
            error.to_string()
        };
        tracing::warn!("Analyst request failed: {}", cause);
        AnalystDeskError::Transport { cause }
    }
}

#[async_trait]
impl Analyst for CortexAnalystClient {
    async fn ask(&self, question: &str, model: &SemanticModelRef) -> AnalystExchange {
        let request = AnalystRequest::single_turn(question, model);
        tracing::debug!(
            "Sending analyst request: model={}, question_len={}",
            request.semantic_model_file,
            question.len()
        );

        let started = Instant::now();
        let outcome = self.send(&request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            Ok(reply) => tracing::debug!(
                "Analyst replied in {} ms with {} blocks (request_id={:?})",
                elapsed_ms,
                reply.content.len(),
                reply.request_id
            ),
            Err(e) => tracing::debug!("Analyst exchange failed after {} ms: {}", elapsed_ms, e),
        }

        AnalystExchange {
            elapsed_ms,
            outcome,
        }
    }
}

/// Parse a success body into a reply
///
/// # Errors
///
/// Returns `MalformedResponse` when the body is not JSON or lacks a
/// `message.content` array of known content blocks.
pub fn parse_reply(body: &str) -> std::result::Result<AnalystReply, AnalystDeskError> {
    let raw: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AnalystDeskError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    let parsed: AnalystResponse = serde_json::from_value(raw.clone())
        .map_err(|e| AnalystDeskError::MalformedResponse(e.to_string()))?;

    Ok(AnalystReply {
        content: parsed.message.content,
        request_id: parsed.request_id,
        warnings: parsed
            .warnings
            .into_iter()
            .map(|w| w.message)
            .filter(|m| !m.is_empty())
            .collect(),
        raw,
    })
}

/// Extract a readable error detail from a failure body
pub(crate) fn service_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no details".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string())
}
