//! Output rendering abstraction for sleuth.
//!
//! Defines the [`Renderer`] trait the agent reports progress through: answer
//! tokens as they stream, tool calls, and tool observations ("thoughts").
//! [`StdoutRenderer`] prints them to the terminal for the REPL; the TUI has
//! its own renderer that forwards events over a channel.

use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};

/// Observer for a running agent turn.
pub trait Renderer {
    /// Render a single token as it arrives.
    fn render_token(&mut self, token: &str);

    /// Called when the full response is complete.
    fn render_done(&mut self);

    /// The agent decided to call a tool.
    fn tool_start(&mut self, name: &str, args: &Value);

    /// A tool returned an observation.
    fn tool_result(&mut self, name: &str, result: &str);
}

/// Renders streaming agent output directly to stdout.
///
/// Thoughts (tool calls and observations) are printed dimmed as they happen
/// so they stay on screen after the answer; answer tokens are buffered for
/// visual line counting so the REPL can erase and reformat them.
pub struct StdoutRenderer {
    buffer: String,
}

impl StdoutRenderer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Calculates the number of cursor-up movements needed to erase
    /// the streamed answer (raw text + render_done output).
    ///
    /// Accounts for terminal line wrapping by using the actual terminal width.
    pub fn visual_line_count(&self) -> usize {
        let width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80)
            .max(1);
        visual_lines(&self.buffer, width)
    }

    /// Whether any answer text streamed (and so needs erasing).
    pub fn has_streamed(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Forgets streamed answer text. Text that preceded a tool call was
    /// reasoning, not the answer, and stays on screen.
    fn settle_streamed_text(&mut self) {
        if !self.buffer.is_empty() {
            println!();
            self.buffer.clear();
        }
    }
}

/// Cursor-up count for `text` at terminal `width`, plus the two lines
/// `render_done` prints.
fn visual_lines(text: &str, width: usize) -> usize {
    let content_lines: usize = text
        .split('\n')
        .map(|line| {
            let len = line.chars().count();
            if len == 0 {
                1
            } else {
                len.div_ceil(width)
            }
        })
        .sum();
    // The first line needs no cursor-up to reach.
    content_lines.saturating_sub(1) + 2
}

/// Shortens an observation to its first line and `max` characters for display.
pub fn preview(text: &str, max: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    let mut out: String = first.chars().take(max).collect();
    if first.chars().count() > max || text.lines().nth(1).is_some() {
        out.push('…');
    }
    out
}

/// Renders tool arguments compactly: the bare query when that's all there is.
pub fn format_args(args: &Value) -> String {
    match args.get("query").and_then(Value::as_str) {
        Some(q) if args.as_object().is_some_and(|o| o.len() == 1) => format!("\"{}\"", q),
        _ => args.to_string(),
    }
}

impl Renderer for StdoutRenderer {
    fn render_token(&mut self, token: &str) {
        self.buffer.push_str(token);
        print!("{}", token);
        // Flush immediately so each token appears as it arrives
        io::stdout().flush().ok();
    }

    fn render_done(&mut self) {
        println!(); // Final newline after stream ends
        println!();
    }

    fn tool_start(&mut self, name: &str, args: &Value) {
        self.settle_streamed_text();
        println!(
            "{} {} {}",
            "⚙".yellow(),
            name.yellow().bold(),
            format_args(args).dimmed()
        );
    }

    fn tool_result(&mut self, name: &str, result: &str) {
        println!(
            "  {} {}",
            format!("{} →", name).dimmed(),
            preview(result, 120).dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visual_lines_accounts_for_wrapping() {
        assert_eq!(visual_lines("short", 80), 2);
        assert_eq!(visual_lines("a\nb\nc", 80), 4);
        assert_eq!(visual_lines(&"x".repeat(100), 40), 4);
    }

    #[test]
    fn test_preview_first_line_only() {
        assert_eq!(preview("Page: Rust\nSummary: ...", 50), "Page: Rust…");
        assert_eq!(preview("short", 50), "short");
        assert_eq!(preview("abcdef", 3), "abc…");
    }

    #[test]
    fn test_format_args_prefers_bare_query() {
        assert_eq!(format_args(&json!({"query": "rust"})), "\"rust\"");
        assert_eq!(
            format_args(&json!({"query": "rust", "n": 2})),
            r#"{"n":2,"query":"rust"}"#
        );
    }
}
