//! SQL statements client
//!
//! Submits one statement to the account's SQL API and collects the first
//! partition of its result. A statement still running when the submission
//! returns is polled by handle until it finishes or the configured time runs
//! out.

use super::results::{Column, ResultSet};
use crate::analyst::client::{service_detail, TOKEN_TYPE_HEADER};
use crate::config::{AnalystConfig, WarehouseConfig};
use crate::error::{AnalystDeskError, Result};
use crate::storage::AppConfig;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Database and schema a statement is resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementContext {
    /// Default database of the statement
    pub database: String,
    /// Default schema of the statement
    pub schema: String,
}

impl From<&AppConfig> for StatementContext {
    fn from(app: &AppConfig) -> Self {
        Self {
            database: app.database.clone(),
            schema: app.schema.clone(),
        }
    }
}

/// Executes generated SQL
#[async_trait]
pub trait StatementRunner: Send + Sync {
    /// Run `statement` and return its rows
    async fn run(&self, statement: &str, context: &StatementContext) -> Result<ResultSet>;
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    database: &'a str,
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    statement_handle: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    num_rows: u64,
    #[serde(default)]
    row_type: Vec<RowType>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
    #[serde(rename = "type", default)]
    data_type: String,
}

impl StatementResponse {
    fn into_result_set(self) -> ResultSet {
        let (columns, reported) = match self.result_set_meta_data {
            Some(meta) => (
                meta.row_type
                    .into_iter()
                    .map(|r| Column {
                        name: r.name,
                        data_type: r.data_type,
                    })
                    .collect(),
                meta.num_rows,
            ),
            None => (Vec::new(), 0),
        };

        let rows: Vec<Vec<Option<String>>> = self
            .data
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();

        ResultSet {
            columns,
            total_rows: reported.max(rows.len() as u64),
            rows,
            statement_handle: self.statement_handle,
        }
    }
}

fn cell_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// State of a statement after one call
#[derive(Debug)]
enum Poll {
    Done(ResultSet),
    Running(String),
}

/// Client for `POST /api/v2/statements`
pub struct SqlStatementsClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    token_type: Option<String>,
    warehouse: Option<String>,
    role: Option<String>,
    timeout: Duration,
    poll_interval: Duration,
}

impl SqlStatementsClient {
    /// Create a client for the account of `analyst`
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(analyst: &AnalystConfig, config: &WarehouseConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("analyst-desk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalystDeskError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}{}",
            analyst.base_url.trim_end_matches('/'),
            config.statements_path
        );
        tracing::info!("Initialized statements client: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            token: analyst.token.clone(),
            token_type: analyst.token_type.clone(),
            warehouse: config.warehouse.clone(),
            role: config.role.clone(),
            timeout,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    /// Full URL statements are submitted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder.header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(token_type) = &self.token_type {
            builder = builder.header(TOKEN_TYPE_HEADER, token_type);
        }
        builder
    }

    async fn call(&self, builder: RequestBuilder) -> Result<Poll> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        interpret(status, &body)
    }
}

fn transport_error(error: reqwest::Error) -> AnalystDeskError {
    tracing::warn!("Statement request failed: {}", error);
    AnalystDeskError::Transport {
        cause: error.to_string(),
    }
}

fn interpret(status: StatusCode, body: &str) -> Result<Poll> {
    if status.as_u16() >= 400 {
        let detail = service_detail(body);
        tracing::error!("Statement failed with {}: {}", status, detail);
        return Err(AnalystDeskError::Query(format!("{} - {}", status.as_u16(), detail)).into());
    }

    let parsed: StatementResponse = serde_json::from_str(body)
        .map_err(|e| AnalystDeskError::Query(format!("unreadable result: {}", e)))?;

    if status == StatusCode::ACCEPTED {
        return match parsed.statement_handle {
            Some(handle) => Ok(Poll::Running(handle)),
            None => {
                Err(AnalystDeskError::Query("statement accepted without a handle".into()).into())
            }
        };
    }

    Ok(Poll::Done(parsed.into_result_set()))
}

#[async_trait]
impl StatementRunner for SqlStatementsClient {
    async fn run(&self, statement: &str, context: &StatementContext) -> Result<ResultSet> {
        let request = StatementRequest {
            statement,
            timeout: self.timeout.as_secs(),
            database: &context.database,
            schema: &context.schema,
            warehouse: self.warehouse.as_deref(),
            role: self.role.as_deref(),
        };
        tracing::debug!(
            "Submitting statement against {}.{} ({} chars)",
            context.database,
            context.schema,
            statement.len()
        );

        let started = Instant::now();
        let mut poll = self
            .call(self.client.post(&self.endpoint).json(&request))
            .await?;

        loop {
            match poll {
                Poll::Done(results) => {
                    tracing::info!(
                        "Statement returned {} of {} row(s) in {} ms",
                        results.rows.len(),
                        results.total_rows,
                        started.elapsed().as_millis()
                    );
                    return Ok(results);
                }
                Poll::Running(handle) => {
                    if started.elapsed() + self.poll_interval >= self.timeout {
                        return Err(AnalystDeskError::Query(format!(
                            "statement {} still running after {} s",
                            handle,
                            self.timeout.as_secs()
                        ))
                        .into());
                    }
                    tracing::debug!("Statement {} still running", handle);
                    tokio::time::sleep(self.poll_interval).await;
                    let url = format!("{}/{}", self.endpoint, handle);
                    poll = self.call(self.client.get(url)).await?;
                }
            }
        }
    }
}
