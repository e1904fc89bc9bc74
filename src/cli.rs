//! Command-line interface definition for analyst-desk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the application launcher, conversations with the
//! analyst service, and bookmarks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// analyst-desk - natural-language questions over your data
///
/// Pick an application, ask questions in plain language, and get back the
/// interpretation, the generated SQL, and follow-up suggestions.
#[derive(Parser, Debug, Clone)]
#[command(name = "analyst-desk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Database file holding applications, audit log, and bookmarks
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// User name recorded with questions and bookmarks
    #[arg(short, long)]
    pub user: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for analyst-desk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage and list applications
    Apps {
        /// Application subcommand
        #[command(subcommand)]
        command: AppsCommand,
    },

    /// Start an interactive conversation with an application
    Chat {
        /// Application identifier
        #[arg(short, long)]
        app: i64,

        /// Semantic model to start with (defaults to the first active one)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// Application identifier
        #[arg(short, long)]
        app: i64,

        /// Semantic model to ask against (defaults to the first active one)
        #[arg(short, long)]
        model: Option<String>,

        /// Run the SQL of the answer and print its rows
        #[arg(long)]
        run: bool,

        /// Run the SQL of the answer and save its rows to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Manage saved questions
    Bookmarks {
        /// Bookmark subcommand
        #[command(subcommand)]
        command: BookmarkCommand,
    },
}

/// Application subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AppsCommand {
    /// List applications with their models
    List,

    /// Create or update applications from a YAML catalog
    Import {
        /// Catalog file
        file: PathBuf,
    },

    /// Export the resized logo of an application
    Logo {
        /// Application identifier
        #[arg(short, long)]
        app: i64,

        /// Output image file; the format follows the extension
        #[arg(short, long)]
        out: PathBuf,

        /// Edge length in pixels
        #[arg(long, default_value_t = crate::launcher::LOGO_SIZE)]
        size: u32,
    },
}

/// Bookmark subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum BookmarkCommand {
    /// Show the most recent bookmarks of an application
    List {
        /// Application identifier
        #[arg(short, long)]
        app: i64,

        /// Maximum number of bookmarks shown
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Save a question
    Add {
        /// Application identifier
        #[arg(short, long)]
        app: i64,

        /// Language tag stored with the bookmark
        #[arg(long)]
        lang: Option<String>,

        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            db: None,
            user: None,
            command: Commands::Apps {
                command: AppsCommand::List,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.db.is_none());
        assert!(matches!(
            cli.command,
            Commands::Apps {
                command: AppsCommand::List
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["analyst-desk", "chat", "--app", "3"]).unwrap();
        if let Commands::Chat { app, model } = cli.command {
            assert_eq!(app, 3);
            assert!(model.is_none());
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_chat_requires_app() {
        assert!(Cli::try_parse_from(["analyst-desk", "chat"]).is_err());
    }

    #[test]
    fn test_cli_parse_ask_joins_words() {
        let cli = Cli::try_parse_from([
            "analyst-desk",
            "--user",
            "alice",
            "ask",
            "--app",
            "3",
            "--model",
            "WinterGameModel",
            "How",
            "many",
            "medals?",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        if let Commands::Ask {
            app,
            model,
            run,
            csv,
            question,
        } = cli.command
        {
            assert_eq!(app, 3);
            assert_eq!(model.as_deref(), Some("WinterGameModel"));
            assert!(!run);
            assert!(csv.is_none());
            assert_eq!(question.join(" "), "How many medals?");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_with_csv() {
        let cli = Cli::try_parse_from([
            "analyst-desk",
            "ask",
            "--app",
            "3",
            "--csv",
            "resultats_requete.csv",
            "Top countries?",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ask { csv: Some(ref path), run: false, .. } if path == &PathBuf::from("resultats_requete.csv")
        ));
    }

    #[test]
    fn test_cli_parse_apps_import() {
        let cli = Cli::try_parse_from(["analyst-desk", "apps", "import", "apps.yaml"]).unwrap();
        if let Commands::Apps {
            command: AppsCommand::Import { file },
        } = cli.command
        {
            assert_eq!(file, PathBuf::from("apps.yaml"));
        } else {
            panic!("Expected apps import command");
        }
    }

    #[test]
    fn test_cli_parse_logo_default_size() {
        let cli =
            Cli::try_parse_from(["analyst-desk", "apps", "logo", "--app", "1", "--out", "l.png"])
                .unwrap();
        if let Commands::Apps {
            command: AppsCommand::Logo { app, out, size },
        } = cli.command
        {
            assert_eq!(app, 1);
            assert_eq!(out, PathBuf::from("l.png"));
            assert_eq!(size, 200);
        } else {
            panic!("Expected apps logo command");
        }
    }

    #[test]
    fn test_cli_parse_bookmarks() {
        let cli = Cli::try_parse_from([
            "analyst-desk",
            "bookmarks",
            "add",
            "--app",
            "3",
            "--lang",
            "EN",
            "Top countries?",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Bookmarks {
                command: BookmarkCommand::Add { app: 3, .. }
            }
        ));

        let cli = Cli::try_parse_from(["analyst-desk", "bookmarks", "list", "--app", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Bookmarks {
                command: BookmarkCommand::List {
                    app: 3,
                    limit: None
                }
            }
        ));
    }

    #[test]
    fn test_cli_parse_global_db() {
        let cli = Cli::try_parse_from(["analyst-desk", "--db", "/tmp/desk.db", "apps", "list"])
            .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/desk.db")));
    }
}
