//! Configuration management for Analyst Desk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AnalystDeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Analyst Desk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Analyst service connection settings
    #[serde(default)]
    pub analyst: AnalystConfig,
    /// Database and stage locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Identity of the person using the desk
    #[serde(default)]
    pub user: UserConfig,
    /// Quick question (bookmark shortcut) settings
    #[serde(default)]
    pub quick_questions: QuickQuestionsConfig,
    /// Execution of generated SQL
    #[serde(default)]
    pub warehouse: WarehouseConfig,
}

/// Analyst service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// Account base URL, e.g. `https://<account>.snowflakecomputing.com`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Versioned message endpoint path
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,

    /// Hard timeout for a single question (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bearer token sent in the `Authorization` header
    #[serde(default)]
    pub token: Option<String>,

    /// Optional `X-Snowflake-Authorization-Token-Type` value (e.g. `KEYPAIR_JWT`)
    #[serde(default)]
    pub token_type: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_endpoint_path() -> String {
    "/api/v2/cortex/analyst/message".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint_path: default_endpoint_path(),
            timeout_ms: default_timeout_ms(),
            token: None,
            token_type: None,
        }
    }
}

/// SQL statement execution settings
///
/// Statements are sent to the same account as the analyst service, with the
/// same credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Statements endpoint path, appended to `analyst.base_url`
    #[serde(default = "default_statements_path")]
    pub statements_path: String,

    /// Virtual warehouse running the statements; the user's default if unset
    #[serde(default)]
    pub warehouse: Option<String>,

    /// Role running the statements; the user's default if unset
    #[serde(default)]
    pub role: Option<String>,

    /// Time allowed for one statement, polling included (seconds)
    #[serde(default = "default_statement_timeout")]
    pub timeout_seconds: u64,

    /// Delay between status checks of a statement still running (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_statements_path() -> String {
    "/api/v2/statements".to_string()
}

fn default_statement_timeout() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            statements_path: default_statements_path(),
            warehouse: None,
            role: None,
            timeout_seconds: default_statement_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite database holding applications, audit log, and bookmarks.
    /// Defaults to `desk.db` in the platform data directory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Root directory of the local stage mirror used for logos.
    /// Defaults to `stages/` in the platform data directory.
    #[serde(default)]
    pub stage_root: Option<PathBuf>,
}

/// User identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// User name recorded in bookmarks and the audit log.
    /// Falls back to the `USER` environment variable when unset.
    #[serde(default)]
    pub name: Option<String>,

    /// Language tag stored with bookmarks
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "FR".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: None,
            language: default_language(),
        }
    }
}

impl UserConfig {
    /// Resolve the effective user name
    pub fn username(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Quick question configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickQuestionsConfig {
    /// Number of bookmarked questions shown (the log fallback shows two fewer)
    #[serde(default = "default_quick_limit")]
    pub limit: usize,

    /// How long a computed list stays cached per user (seconds)
    #[serde(default = "default_quick_ttl")]
    pub ttl_seconds: u64,
}

fn default_quick_limit() -> usize {
    6
}

fn default_quick_ttl() -> u64 {
    3600
}

impl Default for QuickQuestionsConfig {
    fn default() -> Self {
        Self {
            limit: default_quick_limit(),
            ttl_seconds: default_quick_ttl(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AnalystDeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AnalystDeskError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("ANALYST_DESK_BASE_URL") {
            self.analyst.base_url = base_url;
        }

        if let Ok(token) = std::env::var("ANALYST_DESK_TOKEN") {
            self.analyst.token = Some(token);
        }

        if let Ok(token_type) = std::env::var("ANALYST_DESK_TOKEN_TYPE") {
            self.analyst.token_type = Some(token_type);
        }

        if let Ok(timeout) = std::env::var("ANALYST_DESK_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(v) => self.analyst.timeout_ms = v,
                Err(_) => tracing::warn!("Invalid ANALYST_DESK_TIMEOUT_MS: {}", timeout),
            }
        }

        if let Ok(warehouse) = std::env::var("ANALYST_DESK_WAREHOUSE") {
            self.warehouse.warehouse = Some(warehouse);
        }

        if let Ok(role) = std::env::var("ANALYST_DESK_ROLE") {
            self.warehouse.role = Some(role);
        }

        if let Ok(db) = std::env::var("ANALYST_DESK_DB") {
            self.storage.db_path = Some(PathBuf::from(db));
        }

        if let Ok(root) = std::env::var("ANALYST_DESK_STAGE_ROOT") {
            self.storage.stage_root = Some(PathBuf::from(root));
        }

        if let Ok(user) = std::env::var("ANALYST_DESK_USER") {
            self.user.name = Some(user);
        }

        if let Ok(language) = std::env::var("ANALYST_DESK_LANGUAGE") {
            self.user.language = language;
        }

        if let Ok(limit) = std::env::var("ANALYST_DESK_QUICK_LIMIT") {
            match limit.parse() {
                Ok(v) => self.quick_questions.limit = v,
                Err(_) => tracing::warn!("Invalid ANALYST_DESK_QUICK_LIMIT: {}", limit),
            }
        }

        if let Ok(ttl) = std::env::var("ANALYST_DESK_QUICK_TTL_SECONDS") {
            match ttl.parse() {
                Ok(v) => self.quick_questions.ttl_seconds = v,
                Err(_) => tracing::warn!("Invalid ANALYST_DESK_QUICK_TTL_SECONDS: {}", ttl),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db) = &cli.db {
            tracing::debug!("Using database override from CLI: {}", db.display());
            self.storage.db_path = Some(db.clone());
        }

        if let Some(user) = &cli.user {
            self.user.name = Some(user.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.analyst.base_url.trim().is_empty() {
            return Err(
                AnalystDeskError::Config("analyst.base_url cannot be empty".to_string()).into(),
            );
        }

        if let Err(e) = url::Url::parse(&self.analyst.base_url) {
            return Err(AnalystDeskError::Config(format!(
                "Invalid analyst.base_url {}: {}",
                self.analyst.base_url, e
            ))
            .into());
        }

        if !self.analyst.endpoint_path.starts_with('/') {
            return Err(AnalystDeskError::Config(
                "analyst.endpoint_path must start with '/'".to_string(),
            )
            .into());
        }

        if self.analyst.timeout_ms == 0 {
            return Err(AnalystDeskError::Config(
                "analyst.timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if !self.warehouse.statements_path.starts_with('/') {
            return Err(AnalystDeskError::Config(
                "warehouse.statements_path must start with '/'".to_string(),
            )
            .into());
        }

        if self.warehouse.timeout_seconds == 0 {
            return Err(AnalystDeskError::Config(
                "warehouse.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.quick_questions.limit == 0 {
            return Err(AnalystDeskError::Config(
                "quick_questions.limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.quick_questions.ttl_seconds == 0 {
            return Err(AnalystDeskError::Config(
                "quick_questions.ttl_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.user.language.trim().is_empty() {
            return Err(
                AnalystDeskError::Config("user.language cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analyst.endpoint_path, "/api/v2/cortex/analyst/message");
        assert_eq!(config.analyst.timeout_ms, 30_000);
        assert_eq!(config.quick_questions.limit, 6);
        assert_eq!(config.quick_questions.ttl_seconds, 3600);
        assert_eq!(config.user.language, "FR");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = Config::default();
        config.analyst.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.analyst.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.analyst.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_quick_limit() {
        let mut config = Config::default();
        config.quick_questions.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_warehouse() {
        let mut config = Config::default();
        config.warehouse.statements_path = "api/v2/statements".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.warehouse.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_relative_endpoint() {
        let mut config = Config::default();
        config.analyst.endpoint_path = "api/v2/cortex/analyst/message".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
analyst:
  base_url: https://acme.snowflakecomputing.com
  timeout_ms: 10000
  token: secret
  token_type: KEYPAIR_JWT
storage:
  db_path: /tmp/desk.db
user:
  name: alice
  language: EN
quick_questions:
  limit: 8
warehouse:
  warehouse: COMPUTE_WH
  role: ANALYST
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.analyst.base_url, "https://acme.snowflakecomputing.com");
        assert_eq!(config.analyst.endpoint_path, "/api/v2/cortex/analyst/message");
        assert_eq!(config.analyst.timeout_ms, 10000);
        assert_eq!(config.analyst.token.as_deref(), Some("secret"));
        assert_eq!(config.storage.db_path, Some(PathBuf::from("/tmp/desk.db")));
        assert_eq!(config.user.username(), "alice");
        assert_eq!(config.quick_questions.limit, 8);
        assert_eq!(config.quick_questions.ttl_seconds, 3600);
        assert_eq!(config.warehouse.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert_eq!(config.warehouse.role.as_deref(), Some("ANALYST"));
        assert_eq!(config.warehouse.statements_path, "/api/v2/statements");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/analyst-desk.yaml", &cli).unwrap();
        assert_eq!(config.analyst.endpoint_path, default_endpoint_path());
    }

    #[test]
    fn test_cli_overrides_db_and_user() {
        let mut cli = crate::cli::Cli::default();
        cli.db = Some(PathBuf::from("/tmp/override.db"));
        cli.user = Some("bob".to_string());

        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.storage.db_path, Some(PathBuf::from("/tmp/override.db")));
        assert_eq!(config.user.username(), "bob");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("ANALYST_DESK_BASE_URL", "https://env.example.com");
        std::env::set_var("ANALYST_DESK_TIMEOUT_MS", "1234");
        std::env::set_var("ANALYST_DESK_QUICK_LIMIT", "not-a-number");
        std::env::set_var("ANALYST_DESK_WAREHOUSE", "REPORTING_WH");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("ANALYST_DESK_WAREHOUSE");
        std::env::remove_var("ANALYST_DESK_BASE_URL");
        std::env::remove_var("ANALYST_DESK_TIMEOUT_MS");
        std::env::remove_var("ANALYST_DESK_QUICK_LIMIT");

        assert_eq!(config.analyst.base_url, "https://env.example.com");
        assert_eq!(config.analyst.timeout_ms, 1234);
        assert_eq!(config.quick_questions.limit, 6);
        assert_eq!(config.warehouse.warehouse.as_deref(), Some("REPORTING_WH"));
    }

    #[test]
    fn test_blank_user_name_falls_back() {
        let user = UserConfig {
            name: Some("  ".to_string()),
            language: default_language(),
        };
        assert!(!user.username().trim().is_empty());
    }
}
