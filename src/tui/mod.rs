//! Terminal UI module for sleuth.
//!
//! Provides an alternative ratatui-based interface launched via `sleuth chat --tui`.
//! The event loop runs asynchronously using [`tokio::select!`] with a 60 fps
//! render tick, crossterm's async [`EventStream`](crossterm::event::EventStream),
//! the agent's render events, and the running turn itself.

mod app;
mod renderer;
mod ui;

pub use app::App;
pub use renderer::{RenderEvent, TuiRenderer};
pub use ui::draw;

use std::future::Future;
use std::io;
use std::pin::Pin;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use futures::future::OptionFuture;
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use crate::agent::{ReasoningAgent, TurnAgent};
use crate::chat::ChatController;
use crate::config::Config;
use crate::constants::RENDER_CHANNEL_CAPACITY;
use crate::provider::ModelSelection;
use crate::session::Session;
use crate::tools::ToolRegistry;

/// Render tick interval (~60 fps).
const TICK_DURATION: Duration = Duration::from_millis(16);

/// Lines moved by PgUp/PgDn.
const PAGE_LINES: u16 = 10;

/// What the loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Continue,
    Submit(String),
    Quit,
}

type TurnFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// Launches the TUI event loop.
///
/// Enters raw mode and the alternate screen, then loops at ~60 fps. A
/// submitted question runs as a pending future polled by the same loop, so
/// the screen keeps redrawing while the agent works.
///
/// On exit (Ctrl+C or Esc), restores the terminal to its normal state.
pub async fn run_tui(config: Config, selection: &ModelSelection) -> Result<()> {
    let tools = ToolRegistry::from_config(&config.tools)?;
    let controller = ChatController::new(Session::new(config.greeting.clone()));
    let mut app = App::new(
        controller,
        format!("{}/{}", selection.provider, selection.model),
        tools.names().into_iter().map(String::from).collect(),
        selection.provider.needs_api_key(),
    );

    // --- Terminal setup ---
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &config, selection, &tools).await;

    // --- Terminal teardown ---
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
    selection: &ModelSelection,
    tools: &ToolRegistry,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = interval(TICK_DURATION);

    // Channel for streaming agent events into the TUI.
    let (tx, mut rx) = mpsc::channel::<RenderEvent>(RENDER_CHANNEL_CAPACITY);
    let mut pending: Option<TurnFuture<'_>> = None;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                app.tick_spinner();
                terminal.draw(|f| draw(f, app))?;
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => match handle_key(app, key) {
                        KeyAction::Quit => break,
                        KeyAction::Submit(prompt) => {
                            let agent = TurnAgent::new(
                                config,
                                selection,
                                tools,
                                app.controller.session().api_key(),
                            );
                            let mut renderer = TuiRenderer::new(tx.clone());
                            pending = Some(Box::pin(async move {
                                agent.run(&prompt, &mut renderer).await
                            }));
                        }
                        KeyAction::Continue => {}
                    },
                    Some(Err(_)) | None => break,
                    _ => {} // mouse, resize, paste
                }
            }
            Some(render_event) = rx.recv() => {
                app.handle_render_event(render_event);
            }
            Some(result) = OptionFuture::from(pending.as_mut()), if pending.is_some() => {
                pending = None;
                // Events still queued belong to the turn that just ended.
                while let Ok(event) = rx.try_recv() {
                    app.handle_render_event(event);
                }
                app.finish_turn(result);
            }
        }
    }
    Ok(())
}

/// Processes a single key event.
fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return KeyAction::Quit,
        KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('l') if ctrl => app.clear_history(),
        KeyCode::Enter => {
            if let Some(prompt) = app.submit() {
                return KeyAction::Submit(prompt);
            }
        }
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char(c) => app.type_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(PAGE_LINES),
        KeyCode::PageDown => app.scroll_down(PAGE_LINES),
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(
            ChatController::new(Session::new("Hi")),
            "groq/llama-3.1-8b-instant".into(),
            Vec::new(),
            true,
        )
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_typing_then_enter_submits() {
        let mut app = app();
        for c in "hello".chars() {
            handle_key(&mut app, press(KeyCode::Char(c), KeyModifiers::NONE));
        }
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Submit("hello".into())
        );
        // Enter again while the turn runs does nothing.
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Continue
        );
    }

    #[test]
    fn test_quit_and_clear_keys() {
        let mut app = app();
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Esc, KeyModifiers::NONE)),
            KeyAction::Quit
        );

        app.input = "q".into();
        app.submit();
        app.finish_turn(Ok("a".into()));
        handle_key(&mut app, press(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert_eq!(app.controller.session().len(), 1);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_tab_routes_typing_to_key_field() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Tab, KeyModifiers::NONE));
        handle_key(&mut app, press(KeyCode::Char('k'), KeyModifiers::NONE));
        assert_eq!(app.key_input, "k");
        assert!(app.input.is_empty());
    }
}
