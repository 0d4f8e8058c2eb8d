//! Command-line interface definition and dispatch for sleuth.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler.

use crate::{chat, config, provider, tools::ToolRegistry};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Top-level CLI structure for sleuth.
#[derive(Parser, Debug)]
#[command(name = "sleuth", version, about = crate::constants::APP_DESCRIPTION)]
pub struct Cli {
    /// Log to stderr at debug level instead of the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the sleuth CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Provider to use (groq, openai, anthropic, openrouter, ollama)
        #[arg(long)]
        provider: Option<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
        /// Open the terminal UI
        #[arg(long)]
        tui: bool,
    },
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
        /// Provider to use (groq, openai, anthropic, openrouter, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// List the search tools the agent can use
    Tools,
    /// List available models
    Models,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current config (API keys masked)
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat {
            provider: provider_name,
            model,
            tui,
        } => {
            let config = config::Config::load()?;
            let selection =
                provider::resolve_model(provider_name.as_deref(), model.as_deref(), &config)?;
            tracing::info!(provider = %selection.provider, model = %selection.model, tui, "chat started");
            if tui {
                crate::tui::run_tui(config, &selection).await
            } else {
                chat::run_chat(config, &selection).await
            }
        }
        Commands::Ask {
            prompt,
            model,
            provider: provider_name,
        } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                anyhow::bail!("No prompt provided. Usage: sleuth ask \"your question here\"");
            }

            let config = config::Config::load()?;
            let selection =
                provider::resolve_model(provider_name.as_deref(), model.as_deref(), &config)?;

            println!(
                "{} [model: {}]",
                crate::constants::APP_NAME.bold().cyan(),
                selection.model.yellow(),
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            chat::run_once(config, &selection, &prompt).await
        }
        Commands::Tools => {
            let config = config::Config::load()?;
            let tools = ToolRegistry::from_config(&config.tools)?;
            chat::print_tools(&tools);
            Ok(())
        }
        Commands::Models => {
            let config = config::Config::load()?;
            provider::list_models(&config).await
        }
        Commands::Config { action } => {
            let config = config::Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = config::Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let toml_str = toml::to_string_pretty(&config.redacted())?;
                    println!("{}", toml_str);
                }
            }
            Ok(())
        }
    }
}
