//! Interactive chat REPL for sleuth.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). Each question runs through the search
//! agent on its own; the transcript is for the user, not the model.

mod commands;
pub mod controller;

pub(crate) use commands::print_tools;
pub use controller::{ChatController, TurnOutcome};

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

use crate::agent::TurnAgent;
use crate::config::Config;
use crate::constants::{APP_DESCRIPTION, APP_TITLE, INPUT_PLACEHOLDER};
use crate::format;
use crate::output::StdoutRenderer;
use crate::provider::ModelSelection;
use crate::session::Session;
use crate::tools::ToolRegistry;

/// Runs the interactive chat REPL.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/sleuth/chat_history.txt`
pub async fn run_chat(config: Config, selection: &ModelSelection) -> Result<()> {
    let tools = ToolRegistry::from_config(&config.tools)?;
    let mut controller = ChatController::new(Session::new(config.greeting.clone()));

    println!("{}", APP_TITLE.bold().cyan());
    println!("{}", APP_DESCRIPTION.dimmed());
    println!(
        "[model: {}] [tools: {}] (/help for commands, Ctrl+D to exit)",
        format!("{}/{}", selection.provider, selection.model).yellow(),
        tools.names().join(", ").yellow(),
    );
    println!();
    for turn in controller.session().all() {
        println!("{}", format::format_turn(turn));
        println!();
    }
    println!("{}", INPUT_PLACEHOLDER.dimmed());

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                // Slash commands
                if line.starts_with('/') {
                    match commands::handle_slash_command(&line, &mut controller, &tools)? {
                        commands::CommandAction::Continue => continue,
                        commands::CommandAction::Unknown(cmd) => {
                            println!("{} Unknown command: {}", "?".yellow(), cmd);
                            continue;
                        }
                    }
                }

                let _ = rl.add_history_entry(&line);
                println!();

                let agent = TurnAgent::new(
                    &config,
                    selection,
                    &tools,
                    controller.session().api_key(),
                );
                let mut renderer = StdoutRenderer::new();

                match controller.run_turn(&line, &agent, &mut renderer).await {
                    Some(TurnOutcome::Answered(answer)) => {
                        if renderer.has_streamed() {
                            // Erase raw streamed answer and reprint with formatting
                            print!("\x1b[{}A\x1b[J", renderer.visual_line_count());
                            io::stdout().flush().ok();
                        }
                        println!("{}", format::render_markdown_lite(&answer));
                    }
                    Some(TurnOutcome::Failed(notice)) => {
                        eprintln!("{}", notice.red());
                    }
                    None => {}
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Answers a single question and prints the answer, for scripting.
///
/// Thoughts go to stdout as they happen; a failed turn is an error exit.
pub async fn run_once(config: Config, selection: &ModelSelection, prompt: &str) -> Result<()> {
    let tools = ToolRegistry::from_config(&config.tools)?;
    let mut controller = ChatController::new(Session::new(config.greeting.clone()));
    let agent = TurnAgent::new(&config, selection, &tools, None);
    let mut renderer = StdoutRenderer::new();

    match controller.run_turn(prompt, &agent, &mut renderer).await {
        Some(TurnOutcome::Answered(_)) => Ok(()),
        Some(TurnOutcome::Failed(notice)) => anyhow::bail!(notice),
        None => anyhow::bail!("Nothing to ask: the prompt is empty"),
    }
}
