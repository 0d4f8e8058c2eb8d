//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history`, `/clear`, `/key`, `/tools`, and `/help`.
//! Returns a [`CommandAction`] so the REPL loop can decide how to proceed.

use anyhow::Result;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, Write};

use super::controller::ChatController;
use crate::format;
use crate::tools::ToolRegistry;

/// Action returned by slash command handling.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CommandAction {
    /// Command was handled successfully; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

/// Dispatch and handle a slash command.
pub(crate) fn handle_slash_command(
    command: &str,
    controller: &mut ChatController,
    tools: &ToolRegistry,
) -> Result<CommandAction> {
    match command {
        "/history" => {
            for turn in controller.session().all() {
                println!("{}", format::format_turn(turn));
                println!();
            }
            Ok(CommandAction::Continue)
        }
        "/clear" => {
            controller.reset();
            println!("{}", "History cleared.".dimmed());
            println!();
            if let Some(greeting) = controller.session().all().first() {
                println!("{}", format::format_turn(greeting));
                println!();
            }
            Ok(CommandAction::Continue)
        }
        "/key" => {
            match read_masked("API key (Esc cancels, empty clears): ")? {
                Some(key) => {
                    controller.session_mut().set_api_key(&key);
                    let state = match controller.session().api_key() {
                        Some(_) => "API key set for this session.",
                        None => "API key cleared.",
                    };
                    println!("{}", state.dimmed());
                }
                None => println!("{}", "Unchanged.".dimmed()),
            }
            Ok(CommandAction::Continue)
        }
        "/tools" => {
            print_tools(tools);
            Ok(CommandAction::Continue)
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - clear conversation history", "/clear".cyan());
            println!("  {} - enter an API key for this session", "/key".cyan());
            println!("  {} - list the search tools", "/tools".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            Ok(CommandAction::Continue)
        }
        _ => Ok(CommandAction::Unknown(command.to_string())),
    }
}

/// Prints each registered tool with its description.
pub(crate) fn print_tools(tools: &ToolRegistry) {
    if tools.is_empty() {
        println!("{}", "No tools enabled.".dimmed());
        return;
    }
    for def in tools.definitions() {
        println!("  {} - {}", def.name.cyan(), def.description);
    }
}

/// Reads a line without echoing it, printing `*` per character.
///
/// Returns `None` when the user cancels with Esc or Ctrl+C.
fn read_masked(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_masked_raw();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_masked_raw() -> Result<Option<String>> {
    let mut input = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None)
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    print!("\x08 \x08");
                }
            }
            KeyCode::Char(c) => {
                input.push(c);
                print!("*");
            }
            _ => {}
        }
        io::stdout().flush()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    #[test]
    fn test_clear_resets_transcript() {
        let mut controller = ChatController::new(Session::new("hi"));
        controller.submit("question");
        controller.complete(Ok("answer".into()));
        let tools = ToolRegistry::new();

        let action = handle_slash_command("/clear", &mut controller, &tools).unwrap();

        assert_eq!(action, CommandAction::Continue);
        assert_eq!(controller.session().len(), 1);
    }

    #[test]
    fn test_unknown_command() {
        let mut controller = ChatController::new(Session::new("hi"));
        let tools = ToolRegistry::new();
        assert_eq!(
            handle_slash_command("/compact", &mut controller, &tools).unwrap(),
            CommandAction::Unknown("/compact".into())
        );
    }

    #[test]
    fn test_tools_listing_is_reachable_from_chat() {
        let tools = ToolRegistry::from_config(&crate::config::ToolsConfig::default()).unwrap();
        crate::chat::print_tools(&tools);
        crate::chat::print_tools(&ToolRegistry::new());

        let mut controller = ChatController::new(Session::new("hi"));
        assert_eq!(
            handle_slash_command("/tools", &mut controller, &tools).unwrap(),
            CommandAction::Continue
        );
    }
}
