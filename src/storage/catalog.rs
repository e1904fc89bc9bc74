//! Configuration store: applications and their semantic models
//!
//! The desk only reads from these tables. [`SqliteStorage::import_applications`]
//! exists for administrators populating a fresh database.

use super::types::{AppConfig, SemanticModel};
use super::SqliteStorage;
use crate::error::{AnalystDeskError, Result};
use anyhow::Context;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Catalog file accepted by `apps import`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCatalogFile {
    /// Application definitions
    pub apps: Vec<AppDefinition>,
}

/// Application definition as written by an administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDefinition {
    /// Application identifier
    pub app_id: i64,
    /// Display name
    pub name: String,
    /// Target database
    pub database: String,
    /// Target schema
    pub schema: String,
    /// Stage holding the semantic model files
    pub stage: String,
    /// Fully qualified logo path
    #[serde(default)]
    pub logo: Option<String>,
    /// Registered models, in selector order
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

/// Semantic model registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Logical name
    pub name: String,
    /// File name on the stage
    pub file: String,
    /// Inactive models are kept but never offered
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AppCatalogFile {
    /// Parse a catalog from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| AnalystDeskError::Config(format!("Failed to parse app catalog: {}", e)).into())
    }
}

impl SqliteStorage {
    /// Load one application with its active models
    ///
    /// # Errors
    ///
    /// Returns a storage error if no application has this identifier.
    pub fn application(&self, app_id: i64) -> Result<AppConfig> {
        let conn = self.connect()?;

        let row = conn
            .query_row(
                "SELECT app_name, app_database, app_schema, app_stage, app_logo
                FROM cortex_apps WHERE app_id = ?",
                params![app_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query application")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        let (name, database, schema, stage, logo) = row.ok_or_else(|| {
            AnalystDeskError::Storage(format!("Application {} not found", app_id))
        })?;

        let models = self.active_models(&conn, app_id)?;

        Ok(AppConfig {
            app_id,
            name,
            database,
            schema,
            stage,
            logo,
            models,
        })
    }

    /// List all registered applications ordered by identifier
    pub fn list_applications(&self) -> Result<Vec<AppConfig>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT app_id FROM cortex_apps ORDER BY app_id")
            .context("Failed to prepare statement")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .context("Failed to query applications")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        ids.into_iter().map(|id| self.application(id)).collect()
    }

    fn active_models(&self, conn: &rusqlite::Connection, app_id: i64) -> Result<Vec<SemanticModel>> {
        let mut stmt = conn
            .prepare(
                "SELECT model_name, model_file FROM cortex_models
                WHERE app_id = ? AND active = 1
                ORDER BY position, model_name",
            )
            .context("Failed to prepare statement")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        let models = stmt
            .query_map(params![app_id], |row| {
                Ok(SemanticModel {
                    name: row.get(0)?,
                    file: row.get(1)?,
                })
            })
            .context("Failed to query models")
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnalystDeskError::Storage(format!("{:#}", e)))?;

        Ok(models)
    }

    /// Insert or replace application definitions and their models
    ///
    /// Models of an imported application are replaced wholesale.
    pub fn import_applications(&self, apps: &[AppDefinition]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

        for app in apps {
            tx.execute(
                "INSERT INTO cortex_apps (app_id, app_name, app_database, app_schema, app_stage, app_logo)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(app_id) DO UPDATE SET
                    app_name = excluded.app_name,
                    app_database = excluded.app_database,
                    app_schema = excluded.app_schema,
                    app_stage = excluded.app_stage,
                    app_logo = excluded.app_logo",
                params![app.app_id, app.name, app.database, app.schema, app.stage, app.logo],
            )
            .context("Failed to upsert application")
            .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

            tx.execute("DELETE FROM cortex_models WHERE app_id = ?", params![app.app_id])
                .context("Failed to clear models")
                .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

            for (position, model) in app.models.iter().enumerate() {
                tx.execute(
                    "INSERT INTO cortex_models (app_id, model_name, model_file, active, position)
                    VALUES (?, ?, ?, ?, ?)",
                    params![
                        app.app_id,
                        model.name,
                        model.file,
                        model.active,
                        position as i64
                    ],
                )
                .context("Failed to insert model")
                .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;
            }
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| AnalystDeskError::Persistence(format!("{:#}", e)))?;

        tracing::info!("Imported {} applications", apps.len());
        Ok(apps.len())
    }
}
