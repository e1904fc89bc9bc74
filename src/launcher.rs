//! Application launcher
//!
//! Lists the configured applications and prepares their logos, resized to a
//! uniform square so they line up in a grid.

use crate::error::{AnalystDeskError, Result};
use crate::storage::{AppConfig, StagePath, StageReader};
use colored::Colorize;
use image::imageops::FilterType;
use image::DynamicImage;
use prettytable::{format, row, Table};
use std::path::Path;

/// Edge length of launcher logos, in pixels
pub const LOGO_SIZE: u32 = 200;

/// Load a logo from its stage path and resize it to `size` x `size`
pub fn load_logo(reader: &dyn StageReader, logo: &str, size: u32) -> Result<DynamicImage> {
    let path = StagePath::parse(logo)?;
    let bytes = reader.read(&path)?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| AnalystDeskError::Storage(format!("Failed to decode {}: {}", path, e)))?;
    Ok(image.resize_exact(size, size, FilterType::Triangle))
}

/// Write the resized logo of `app` to `out`; the format follows the extension
pub fn export_logo(reader: &dyn StageReader, app: &AppConfig, out: &Path, size: u32) -> Result<()> {
    let logo = app.logo.as_deref().ok_or_else(|| {
        AnalystDeskError::Validation(format!("Application {} has no logo", app.name))
    })?;
    let image = load_logo(reader, logo, size)?;
    image.save(out).map_err(|e| {
        AnalystDeskError::Storage(format!("Failed to write {}: {}", out.display(), e))
    })?;
    tracing::info!("Wrote {}x{} logo of {} to {}", size, size, app.name, out.display());
    Ok(())
}

/// Whether the logo of `app` can be displayed
///
/// A missing or unreadable logo never hides the application.
pub fn logo_status(reader: Option<&dyn StageReader>, app: &AppConfig) -> &'static str {
    match (reader, app.logo.as_deref()) {
        (_, None) => "-",
        (None, Some(_)) => "not checked",
        (Some(reader), Some(logo)) => match load_logo(reader, logo, LOGO_SIZE) {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!("Logo of {} unavailable: {:#}", app.name, e);
                "unavailable"
            }
        },
    }
}

/// Table of applications with their target stage and active models
pub fn launcher_table(apps: &[AppConfig], reader: Option<&dyn StageReader>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![
        "ID".bold(),
        "Application".bold(),
        "Target".bold(),
        "Models".bold(),
        "Logo".bold()
    ]);

    for app in apps {
        let models = if app.models.is_empty() {
            "-".to_string()
        } else {
            app.models
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(row![
            app.app_id.to_string().cyan(),
            app.name,
            format!("{}.{}.{}", app.database, app.schema, app.stage),
            models,
            logo_status(reader, app)
        ]);
    }

    table
}
