//! EduMind CLI - the main entry point.
//!
//! Commands:
//! - `onboard`  - Write a default config
//! - `chat`     - Interactive chat with attachments
//! - `send`     - Send a single message
//! - `inspect`  - Show how an attachment would be extracted
//! - `models`   - List configured models
//! - `config`   - Show, locate, or validate the config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "edumind",
    about = "EduMind — study assistant chat with text, image, and PDF attachments",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat interactively
    Chat {
        /// Model to start with (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Send a single message and print the reply
    Send {
        /// The message text
        #[arg(short, long, default_value = "")]
        message: String,

        /// Files to attach (.txt, .png, .jpg, .jpeg, .pdf)
        #[arg(short, long = "attach")]
        attachments: Vec<PathBuf>,

        /// Model to use (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Show how a file would be extracted
    Inspect {
        /// The file to inspect
        file: PathBuf,
    },

    /// List configured models and their capabilities
    Models,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so replies on stdout stay clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { model } => commands::chat::run(model).await?,
        Commands::Send {
            message,
            attachments,
            model,
        } => commands::send::run(message, attachments, model).await?,
        Commands::Inspect { file } => commands::inspect::run(file).await?,
        Commands::Models => commands::models::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_accepts_repeated_attachments() {
        let cli = Cli::try_parse_from([
            "edumind", "send", "-m", "compare", "-a", "a.png", "-a", "notes.txt", "--model",
            "deepseek-ai/deepseek-vl2",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                message,
                attachments,
                model,
            } => {
                assert_eq!(message, "compare");
                assert_eq!(attachments, vec![PathBuf::from("a.png"), PathBuf::from("notes.txt")]);
                assert_eq!(model.as_deref(), Some("deepseek-ai/deepseek-vl2"));
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["edumind", "models", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn config_requires_action() {
        assert!(Cli::try_parse_from(["edumind", "config"]).is_err());
        assert!(Cli::try_parse_from(["edumind", "config", "validate"]).is_ok());
    }
}
