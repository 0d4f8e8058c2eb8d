//! TUI application state for sleuth.
//!
//! Wraps the [`ChatController`] with what only the terminal UI needs: the
//! input buffers, which field has focus, the live thoughts of the running
//! turn, and the scroll position.

use anyhow::Result;

use super::renderer::RenderEvent;
use crate::chat::ChatController;
use crate::output::preview;

/// Which text field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    ApiKey,
}

/// Core application state for the TUI.
pub struct App {
    pub controller: ChatController,
    /// Current text in the question box.
    pub input: String,
    /// API key being typed in the settings sidebar. Never drawn in clear.
    pub key_input: String,
    pub focus: Focus,
    /// Tool calls and observations of the running turn.
    pub thoughts: Vec<String>,
    /// Answer text streamed so far in the running turn.
    pub streaming: String,
    pub spinner_frame: usize,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_offset: u16,
    /// `provider/model` shown in the sidebar.
    pub model_label: String,
    pub tool_names: Vec<String>,
    pub needs_api_key: bool,
}

impl App {
    pub fn new(
        controller: ChatController,
        model_label: String,
        tool_names: Vec<String>,
        needs_api_key: bool,
    ) -> Self {
        Self {
            controller,
            input: String::new(),
            key_input: String::new(),
            focus: Focus::Input,
            thoughts: Vec::new(),
            streaming: String::new(),
            spinner_frame: 0,
            scroll_offset: 0,
            model_label,
            tool_names,
            needs_api_key,
        }
    }

    /// Handles Enter for whichever field has focus.
    ///
    /// In the key field this stores the key on the session and returns focus
    /// to the question box. In the question box it starts a turn and returns
    /// the prompt to hand to the agent.
    pub fn submit(&mut self) -> Option<String> {
        match self.focus {
            Focus::ApiKey => {
                let key = std::mem::take(&mut self.key_input);
                self.controller.session_mut().set_api_key(&key);
                self.focus = Focus::Input;
                None
            }
            Focus::Input => {
                if self.controller.is_processing() {
                    return None;
                }
                let prompt = self.controller.submit(&self.input)?;
                self.input.clear();
                self.thoughts.clear();
                self.streaming.clear();
                self.scroll_offset = 0;
                Some(prompt)
            }
        }
    }

    /// Records the agent's result for the running turn.
    pub fn finish_turn(&mut self, result: Result<String>) {
        self.controller.complete(result);
        self.thoughts.clear();
        self.streaming.clear();
        self.scroll_offset = 0;
    }

    /// Resets the transcript to the greeting. Ignored mid-turn.
    pub fn clear_history(&mut self) {
        if self.controller.reset() {
            self.thoughts.clear();
            self.streaming.clear();
            self.scroll_offset = 0;
        }
    }

    pub fn handle_render_event(&mut self, event: RenderEvent) {
        if !self.controller.is_processing() {
            return;
        }
        match event {
            RenderEvent::Token(token) => self.streaming.push_str(&token),
            RenderEvent::ToolStart { name, args } => {
                let reasoning = std::mem::take(&mut self.streaming);
                let reasoning = reasoning.trim();
                if !reasoning.is_empty() {
                    self.thoughts.push(reasoning.to_string());
                }
                self.thoughts.push(format!("⚙ {} {}", name, args));
            }
            RenderEvent::ToolResult { name, result } => {
                self.thoughts
                    .push(format!("  {} → {}", name, preview(&result, 100)));
            }
            RenderEvent::Done => {}
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::ApiKey,
            Focus::ApiKey => Focus::Input,
        };
    }

    pub fn type_char(&mut self, c: char) {
        match self.focus {
            Focus::Input => self.input.push(c),
            Focus::ApiKey => self.key_input.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Input => self.input.pop(),
            Focus::ApiKey => self.key_input.pop(),
        };
    }

    /// What the API key field shows: stars while typing, else whether a key is set.
    pub fn masked_key(&self) -> String {
        if !self.key_input.is_empty() {
            "*".repeat(self.key_input.chars().count())
        } else if self.controller.session().api_key().is_some() {
            "********".to_string()
        } else if self.needs_api_key {
            "(from env / config)".to_string()
        } else {
            "(not needed)".to_string()
        }
    }

    pub fn tick_spinner(&mut self) {
        if self.controller.is_processing() {
            self.spinner_frame = (self.spinner_frame + 1) % crate::constants::SPINNER_FRAMES.len();
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::session::Session;
    use anyhow::anyhow;

    fn app() -> App {
        App::new(
            ChatController::new(Session::new("Hi!")),
            "groq/llama-3.1-8b-instant".into(),
            vec!["search".into(), "wikipedia".into(), "arxiv".into()],
            true,
        )
    }

    #[test]
    fn test_submit_starts_turn_and_clears_input() {
        let mut app = app();
        app.input = "who wrote dune?".into();

        assert_eq!(app.submit().as_deref(), Some("who wrote dune?"));
        assert!(app.input.is_empty());
        assert!(app.controller.is_processing());

        // A second Enter mid-turn is ignored and keeps the typed text.
        app.input = "another".into();
        assert!(app.submit().is_none());
        assert_eq!(app.input, "another");
    }

    #[test]
    fn test_key_field_stores_key_on_session() {
        let mut app = app();
        app.toggle_focus();
        for c in "gsk_test".chars() {
            app.type_char(c);
        }
        assert_eq!(app.masked_key(), "********");
        assert!(app.input.is_empty());

        assert!(app.submit().is_none());
        assert_eq!(app.controller.session().api_key(), Some("gsk_test"));
        assert_eq!(app.focus, Focus::Input);
        assert!(app.key_input.is_empty());
    }

    #[test]
    fn test_thoughts_follow_render_events() {
        let mut app = app();
        app.input = "q".into();
        app.submit();

        app.handle_render_event(RenderEvent::Token("I should search.".into()));
        app.handle_render_event(RenderEvent::ToolStart {
            name: "search".into(),
            args: "\"q\"".into(),
        });
        app.handle_render_event(RenderEvent::ToolResult {
            name: "search".into(),
            result: "snippet".into(),
        });
        app.handle_render_event(RenderEvent::Token("Answer".into()));

        assert_eq!(
            app.thoughts,
            vec!["I should search.", "⚙ search \"q\"", "  search → snippet"]
        );
        assert_eq!(app.streaming, "Answer");

        app.finish_turn(Ok("Answer".into()));
        assert!(app.thoughts.is_empty());
        assert_eq!(
            app.controller.session().last_of(Role::Assistant).unwrap().text(),
            "Answer"
        );
    }

    #[test]
    fn test_failed_turn_sets_notice() {
        let mut app = app();
        app.input = "q".into();
        app.submit();
        app.finish_turn(Err(anyhow!("boom")));
        assert_eq!(app.controller.notice(), Some("An error occurred: boom"));
        assert_eq!(app.controller.session().len(), 2);
    }

    #[test]
    fn test_clear_history_ignored_mid_turn() {
        let mut app = app();
        app.input = "q".into();
        app.submit();
        app.clear_history();
        assert_eq!(app.controller.session().len(), 2);

        app.finish_turn(Ok("a".into()));
        app.clear_history();
        assert_eq!(app.controller.session().len(), 1);
    }
}
