use crate::cli::BookmarkCommand;
use crate::commands::open_storage;
use crate::config::Config;
use crate::error::{AnalystDeskError, Result};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle bookmark commands
pub fn handle_bookmarks(config: &Config, command: BookmarkCommand) -> Result<()> {
    let storage = open_storage(config)?;

    match command {
        BookmarkCommand::List { app, limit } => {
            let app = storage.application(app)?;
            let limit = limit.unwrap_or(config.quick_questions.limit);
            let bookmarks = storage.recent_bookmarks(app.app_id, limit)?;

            if bookmarks.is_empty() {
                println!("{}", format!("No bookmarks for {}.", app.name).yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "Question".bold(),
                "Language".bold(),
                "Saved By".bold(),
                "Saved At".bold()
            ]);

            for bookmark in bookmarks {
                let saved = bookmark.created_at.format("%Y-%m-%d %H:%M").to_string();
                table.add_row(prettytable::row![
                    bookmark.question,
                    bookmark.language,
                    bookmark.username.cyan(),
                    saved
                ]);
            }

            println!("\nBookmarks of {}:", app.name);
            table.printstd();
            println!();
        }
        BookmarkCommand::Add {
            app,
            lang,
            question,
        } => {
            let app = storage.application(app)?;
            let question = question.join(" ");
            if question.trim().is_empty() {
                return Err(
                    AnalystDeskError::Validation("Question must not be empty".into()).into(),
                );
            }
            let language = lang.unwrap_or_else(|| config.user.language.clone());
            let entry = storage.save_bookmark(
                app.app_id,
                &config.user.username(),
                question.trim(),
                &language,
            )?;
            println!(
                "{}",
                format!("Bookmarked for {}: {}", app.name, entry.question).green()
            );
        }
    }

    Ok(())
}
