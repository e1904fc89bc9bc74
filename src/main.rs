//! analyst-desk - terminal client for Cortex Analyst applications
//!
#![doc = "Main entry point for the analyst-desk application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use analyst_desk::cli::{Cli, Commands};
use analyst_desk::commands;
use analyst_desk::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Apps { command } => {
            tracing::debug!("Starting apps command");
            commands::apps::handle_apps(&config, command)?;
            Ok(())
        }
        Commands::Chat { app, model } => {
            tracing::info!("Starting interactive chat with app {}", app);
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::chat::run_chat(config, app, model).await?;
            Ok(())
        }
        Commands::Ask {
            app,
            model,
            run,
            csv,
            question,
        } => {
            let question = question.join(" ");
            tracing::debug!("Asking app {}: {}", app, question);
            commands::ask::run_ask(config, app, model, &question, run, csv).await?;
            Ok(())
        }
        Commands::Bookmarks { command } => {
            tracing::debug!("Starting bookmarks command");
            commands::bookmarks::handle_bookmarks(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so replies printed on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "analyst_desk=debug"
    } else {
        "analyst_desk=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
