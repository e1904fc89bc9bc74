//! analyst-desk - terminal client for Cortex Analyst applications
//!
//! This library provides the core functionality of the desk: conversation
//! sessions against the Cortex Analyst message endpoint, the audit trail of
//! answered questions, shared bookmarks with a quick-question fallback, and
//! the SQLite-backed application catalog.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `analyst`: Analyst service client and conversation types
//! - `session`: Session state machine, registry, and controller
//! - `storage`: Application catalog, audit log, bookmarks, and stage files
//! - `quick_questions`: Cached bookmark list with audit log fallback
//! - `cache`: Time-to-live cache
//! - `warehouse`: On-demand execution of generated SQL and CSV export
//! - `launcher`: Application listing and logos
//! - `render`: Terminal rendering of replies
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use analyst_desk::{AnalystDesk, Config, CortexAnalystClient, SqliteStorage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let storage = SqliteStorage::open(config.storage.db_path.as_deref())?;
//!     let app = storage.application(3)?;
//!     let client = CortexAnalystClient::new(&config.analyst)?;
//!     let mut desk = AnalystDesk::new(app, Arc::new(client), storage, &config);
//!
//!     let outcome = desk
//!         .submit_question("alice", "How many medals did France win?")
//!         .await?;
//!     println!("{}", outcome.reply.text());
//!     Ok(())
//! }
//! ```

pub mod analyst;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod launcher;
pub mod quick_questions;
pub mod render;
pub mod session;
pub mod storage;
pub mod warehouse;

// Re-export commonly used types
pub use analyst::{Analyst, CortexAnalystClient, Message};
pub use config::Config;
pub use error::{AnalystDeskError, Result};
pub use session::{AnalystDesk, SessionKey};
pub use storage::SqliteStorage;
