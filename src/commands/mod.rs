/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `apps`      launcher listing, catalog import, logo export
- `chat`      interactive conversation with one application
- `ask`       a single question, optionally running its SQL
- `bookmarks` saved questions

Handlers wire configuration into the library components (storage, analyst
client, session controller) and print results to stdout.
*/

use crate::analyst::CortexAnalystClient;
use crate::config::Config;
use crate::error::{AnalystDeskError, Result};
use crate::render;
use crate::session::{AnalystDesk, TurnOutcome};
use crate::storage::{self, LocalStage, SqliteStorage};
use crate::warehouse::{self, ResultSet, SqlStatementsClient};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

pub mod apps;
pub mod bookmarks;
pub mod special_commands;

/// Open the database named by the configuration, or the default one
pub fn open_storage(config: &Config) -> Result<SqliteStorage> {
    SqliteStorage::open(config.storage.db_path.as_deref())
}

/// Local mirror of the application stages
pub fn stage_reader(config: &Config) -> Option<LocalStage> {
    config
        .storage
        .stage_root
        .clone()
        .or_else(|| storage::data_dir().ok().map(|dir| dir.join("stages")))
        .map(LocalStage::new)
}

/// Build the controller of `app_id` for the configured user
///
/// When `model` is given it replaces the default selection.
pub fn open_desk(config: &Config, app_id: i64, model: Option<&str>) -> Result<AnalystDesk> {
    let storage = open_storage(config)?;
    let app = storage.application(app_id)?;
    let client = CortexAnalystClient::new(&config.analyst)?;
    let runner = SqlStatementsClient::new(&config.analyst, &config.warehouse)?;
    let mut desk = AnalystDesk::new(app, Arc::new(client), storage, config)
        .with_statement_runner(Arc::new(runner));

    if let Some(model) = model {
        desk.select_model(&config.user.username(), model)?;
    }
    Ok(desk)
}

/// Print a reply followed by its notices
pub fn print_outcome(outcome: &TurnOutcome) {
    print!("{}", render::render_content(&outcome.reply.content));
    for notice in &outcome.notices {
        eprintln!("{}", notice.to_string().yellow());
    }
    println!("{}", format!("({} ms)", outcome.elapsed_ms).dimmed());
}

/// Print the rows of a statement
pub fn print_results(results: &ResultSet) {
    print!("{}", render::render_results(results));
}

/// Save rows as CSV and confirm on stdout
pub fn save_csv(results: &ResultSet, path: &Path) -> Result<()> {
    let rows = warehouse::export_csv(results, path)?;
    println!("{}", format!("Saved {} row(s) to {}", rows, path.display()).green());
    Ok(())
}

/// Message shown for a failed exchange
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AnalystDeskError>() {
        Some(e) if e.is_user_facing() => e.to_string(),
        _ => format!("{:#}", err),
    }
}

// Chat command handler
pub mod chat {
    //! Interactive conversation handler.
    //!
    //! Opens the controller for one application and runs a readline-based
    //! loop: plain input is a question, `/` commands drive models,
    //! suggestions, quick questions, and bookmarks. No failure ends the loop.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `app_id` - Application to talk to
    /// * `model` - Optional semantic model replacing the default one
    pub async fn run_chat(config: Config, app_id: i64, model: Option<String>) -> Result<()> {
        let username = config.user.username();
        let mut desk = open_desk(&config, app_id, model.as_deref())?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&desk, &username);
        let mut quick = show_quick_questions(&mut desk, &username);
        let mut last_results: Option<ResultSet> = None;

        loop {
            let prompt = format!(
                "[{}] >> ",
                desk.session(&username).selected_model().unwrap_or("no model")
            );
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::None => {
                            ask(&mut desk, &username, trimmed).await;
                        }
                        SpecialCommand::Suggest(n) => {
                            let history = desk.session(&username).history().to_vec();
                            match render::suggestion_at(&history, n) {
                                Some(text) => {
                                    println!("{}", format!("> {}", text).cyan());
                                    match desk.select_suggestion(&username, text).await {
                                        Ok(outcome) => print_outcome(&outcome),
                                        Err(e) => print_error(&e),
                                    }
                                }
                                None => eprintln!(
                                    "{}",
                                    format!("No suggestion number {}", n).red()
                                ),
                            }
                        }
                        SpecialCommand::RunSql(n) => {
                            match desk.run_statement(&username, n).await {
                                Ok(results) => {
                                    print_results(&results);
                                    last_results = Some(results);
                                }
                                Err(e) => print_error(&e),
                            }
                        }
                        SpecialCommand::ExportCsv(path) => match &last_results {
                            Some(results) => {
                                if let Err(e) = save_csv(results, &path) {
                                    print_error(&e);
                                }
                            }
                            None => eprintln!("{}", "Run a statement first with /run".yellow()),
                        },
                        SpecialCommand::QuickQuestions => {
                            quick = show_quick_questions(&mut desk, &username);
                        }
                        SpecialCommand::AskQuick(n) => match quick.get(n - 1).cloned() {
                            Some(question) => {
                                println!("{}", format!("> {}", question).cyan());
                                ask(&mut desk, &username, &question).await;
                            }
                            None => eprintln!(
                                "{}",
                                format!("No quick question number {}", n).red()
                            ),
                        },
                        SpecialCommand::Bookmark => {
                            match desk.session(&username).last_question() {
                                Some(question) => {
                                    let notice = desk.bookmark(&username, &question);
                                    println!("{}", notice.to_string().green());
                                }
                                None => eprintln!("{}", "Nothing to bookmark yet".yellow()),
                            }
                        }
                        SpecialCommand::History => {
                            let session = desk.session(&username);
                            if session.history().is_empty() {
                                println!("{}", "No questions asked yet.".yellow());
                            } else {
                                print!("{}", render::render_history(session.history()));
                            }
                        }
                        SpecialCommand::ListModels => {
                            let selected = desk
                                .session(&username)
                                .selected_model()
                                .map(str::to_string);
                            for name in desk.models() {
                                if selected.as_deref() == Some(name) {
                                    println!("  {} {}", "*".green(), name.bold());
                                } else {
                                    println!("    {}", name);
                                }
                            }
                        }
                        SpecialCommand::SwitchModel(name) => {
                            match desk.select_model(&username, &name) {
                                Ok(()) => println!(
                                    "Switched to {}, starting a new conversation\n",
                                    name.cyan()
                                ),
                                Err(e) => print_error(&e),
                            }
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        desk.end_session(&username);
        println!("Goodbye!");
        Ok(())
    }

    async fn ask(desk: &mut AnalystDesk, username: &str, question: &str) {
        match desk.submit_question(username, question).await {
            Ok(outcome) => {
                print_outcome(&outcome);
                if outcome.reply.statements().next().is_some() {
                    println!("{}", "Type /run to execute the SQL".dimmed());
                }
            }
            Err(e) => print_error(&e),
        }
    }

    fn print_error(err: &anyhow::Error) {
        eprintln!("{}", format!("Error: {}", describe_error(err)).red());
    }

    fn show_quick_questions(desk: &mut AnalystDesk, username: &str) -> Vec<String> {
        match desk.quick_questions(username) {
            Ok(questions) if questions.is_empty() => {
                println!("{}", "No quick questions yet.".yellow());
                questions
            }
            Ok(questions) => {
                println!("{}", "Quick questions (/ask <n>):".bold());
                print!("{}", render::render_numbered(&questions));
                println!();
                questions
            }
            Err(e) => {
                tracing::warn!("Quick questions unavailable: {:#}", e);
                Vec::new()
            }
        }
    }

    fn print_welcome_banner(desk: &AnalystDesk, username: &str) {
        let app = desk.app();
        println!("\n{}", format!("Analyst Desk - {}", app.name).bold());
        println!(
            "Target: {}.{}.{}   User: {}",
            app.database,
            app.schema,
            app.stage,
            username.cyan()
        );
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}

// Single question handler
pub mod ask {
    //! One-shot question handler.

    use super::*;
    use std::path::PathBuf;

    /// Ask one question and print the answer
    ///
    /// With `run` the first SQL statement of the answer is executed and its
    /// rows are printed; with `csv` they are saved to that file.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the exchange or of the statement
    pub async fn run_ask(
        config: Config,
        app_id: i64,
        model: Option<String>,
        question: &str,
        run: bool,
        csv: Option<PathBuf>,
    ) -> Result<()> {
        let username = config.user.username();
        let mut desk = open_desk(&config, app_id, model.as_deref())?;
        let outcome = desk.submit_question(&username, question).await?;
        print_outcome(&outcome);

        if !run && csv.is_none() {
            return Ok(());
        }
        if outcome.reply.statements().next().is_none() {
            eprintln!("{}", "The answer contains no SQL to run".yellow());
            return Ok(());
        }

        let results = desk.run_statement(&username, 1).await?;
        if run {
            print_results(&results);
        }
        if let Some(path) = csv {
            save_csv(&results, &path)?;
        }
        Ok(())
    }
}
