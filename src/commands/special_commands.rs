//! Special commands parser for interactive chat
//!
//! Commands are prefixed with `/`; the command word is case-insensitive,
//! arguments such as model names are kept as typed. Anything else is a
//! question for the analyst.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// List the semantic models of the application
    ListModels,

    /// Switch to another semantic model, starting a new conversation
    SwitchModel(String),

    /// Submit suggestion `n` of the latest answer
    Suggest(usize),

    /// Run SQL statement `n` of the latest answer and show its rows
    RunSql(usize),

    /// Write the rows of the last statement run to a CSV file
    ExportCsv(PathBuf),

    /// Bookmark the last question asked
    Bookmark,

    /// Show the quick questions
    QuickQuestions,

    /// Submit quick question `n`
    AskQuick(usize),

    /// Print the conversation so far
    History,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question
    None,
}

fn numbered(command: &str, usage: &str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use analyst_desk::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/suggest 2").unwrap(), SpecialCommand::Suggest(2));
/// assert_eq!(
///     parse_special_command("How many medals did France win?").unwrap(),
///     SpecialCommand::None
/// );
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, arg)) => (word.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/models" if arg.is_empty() => Ok(SpecialCommand::ListModels),
        "/models" => Err(CommandError::UnsupportedArgument {
            command: "/models".to_string(),
            arg: arg.to_string(),
        }),

        "/model" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/model".to_string(),
            usage: "/model <model_name>".to_string(),
        }),
        "/model" => Ok(SpecialCommand::SwitchModel(arg.to_string())),

        "/suggest" => numbered("/suggest", "/suggest <n>", arg).map(SpecialCommand::Suggest),
        "/ask" => numbered("/ask", "/ask <n>", arg).map(SpecialCommand::AskQuick),

        "/run" if arg.is_empty() => Ok(SpecialCommand::RunSql(1)),
        "/run" => numbered("/run", "/run [n]", arg).map(SpecialCommand::RunSql),

        "/csv" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/csv".to_string(),
            usage: "/csv <file>".to_string(),
        }),
        "/csv" => Ok(SpecialCommand::ExportCsv(PathBuf::from(arg))),

        "/bookmark" => Ok(SpecialCommand::Bookmark),
        "/quick" => Ok(SpecialCommand::QuickQuestions),
        "/history" => Ok(SpecialCommand::History),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        cmd => Err(CommandError::UnknownCommand(cmd.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

SEMANTIC MODELS:
  /models         - List the semantic models of this application
  /model <name>   - Switch model (starts a new conversation)

SUGGESTIONS AND QUICK QUESTIONS:
  /suggest <n>    - Ask suggestion number n of the latest answer
  /quick          - Show bookmarks or frequently asked questions
  /ask <n>        - Ask quick question number n
  /bookmark       - Save the last question for everyone using this application

SQL RESULTS:
  /run [n]        - Run SQL statement n (default 1) of the latest answer
  /csv <file>     - Save the rows of the last statement run as CSV

SESSION:
  /history        - Show the conversation so far
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

Anything else is sent to the analyst as a question.
"#
    );
}
