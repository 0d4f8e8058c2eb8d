//! TUI-aware renderer that forwards agent events to the TUI event loop.
//!
//! [`TuiRenderer`] implements the [`Renderer`] trait by sending
//! [`RenderEvent`] variants over a tokio mpsc channel. The TUI main
//! loop receives these events and updates the [`App`](super::App) state
//! accordingly.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::output::{format_args, Renderer};

/// Events sent from the renderer to the TUI event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// A single token arrived from the LLM stream.
    Token(String),
    /// The LLM response is complete.
    Done,
    /// The agent called a tool.
    ToolStart {
        name: String,
        /// Compact rendering of the arguments.
        args: String,
    },
    /// A tool returned its observation.
    ToolResult { name: String, result: String },
}

/// Renderer that sends events to the TUI via an mpsc channel.
///
/// All trait methods are fire-and-forget: if the channel is full or
/// closed the event is silently dropped.
pub struct TuiRenderer {
    tx: mpsc::Sender<RenderEvent>,
}

impl TuiRenderer {
    pub fn new(tx: mpsc::Sender<RenderEvent>) -> Self {
        Self { tx }
    }
}

impl Renderer for TuiRenderer {
    fn render_token(&mut self, token: &str) {
        let _ = self.tx.try_send(RenderEvent::Token(token.to_string()));
    }

    fn render_done(&mut self) {
        let _ = self.tx.try_send(RenderEvent::Done);
    }

    fn tool_start(&mut self, name: &str, args: &Value) {
        let _ = self.tx.try_send(RenderEvent::ToolStart {
            name: name.to_string(),
            args: format_args(args),
        });
    }

    fn tool_result(&mut self, name: &str, result: &str) {
        let _ = self.tx.try_send(RenderEvent::ToolResult {
            name: name.to_string(),
            result: result.to_string(),
        });
    }
}
