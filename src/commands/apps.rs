use crate::cli::AppsCommand;
use crate::commands::{open_storage, stage_reader};
use crate::config::Config;
use crate::error::{AnalystDeskError, Result};
use crate::launcher;
use crate::storage::{AppCatalogFile, StageReader};
use colored::Colorize;

/// Handle application commands
pub fn handle_apps(config: &Config, command: AppsCommand) -> Result<()> {
    let storage = open_storage(config)?;

    match command {
        AppsCommand::List => {
            let apps = storage.list_applications()?;
            if apps.is_empty() {
                println!("{}", "No applications configured.".yellow());
                println!(
                    "Use {} to register some.",
                    "analyst-desk apps import <file.yaml>".cyan()
                );
                return Ok(());
            }

            let stage = stage_reader(config);
            let reader = stage.as_ref().map(|s| s as &dyn StageReader);
            let table = launcher::launcher_table(&apps, reader);

            println!("\nApplications:");
            table.printstd();
            println!();
            println!(
                "Use {} to start a conversation.",
                "analyst-desk chat --app <ID>".cyan()
            );
            println!();
        }
        AppsCommand::Import { file } => {
            let contents = std::fs::read_to_string(&file).map_err(|e| {
                AnalystDeskError::Config(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let catalog = AppCatalogFile::from_yaml(&contents)?;
            let count = storage.import_applications(&catalog.apps)?;
            println!(
                "{}",
                format!("Imported {} application(s) from {}", count, file.display()).green()
            );
        }
        AppsCommand::Logo { app, out, size } => {
            let app = storage.application(app)?;
            let stage = stage_reader(config).ok_or_else(|| {
                AnalystDeskError::Config("No stage root configured (storage.stage_root)".into())
            })?;
            launcher::export_logo(&stage, &app, &out, size)?;
            println!(
                "{}",
                format!("Saved logo of {} to {}", app.name, out.display()).green()
            );
        }
    }

    Ok(())
}
