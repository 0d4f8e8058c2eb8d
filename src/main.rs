//! Entry point for sleuth, a terminal chat agent that answers questions by
//! searching the web, Wikipedia, and arXiv.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! sets up logging, and dispatches to the appropriate subcommand handler.

mod agent;
mod chat;
mod cli;
mod config;
mod constants;
mod format;
mod logging;
mod message;
mod output;
mod provider;
mod session;
mod tools;
mod tui;

use anyhow::Result;

/// Runs the sleuth CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, and dispatches the chosen
/// subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    logging::init(cli.verbose)?;
    cli::run(cli).await
}
