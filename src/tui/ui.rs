//! TUI drawing logic for sleuth.
//!
//! Layout: a header with the app title, a settings sidebar on the left, and
//! on the right the transcript, an optional error notice, and an
//! auto-growing input box.

use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::app::{App, Focus};
use crate::constants::{
    APP_DESCRIPTION, APP_TITLE, INPUT_PLACEHOLDER, SIDEBAR_WIDTH, SPINNER_FRAMES,
};
use crate::message::Role;

/// Draws the whole frame.
pub fn draw(f: &mut Frame, app: &App) {
    let [header_area, body_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(5)]).areas(f.area());
    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .areas(body_area);

    draw_header(f, header_area);
    draw_sidebar(f, app, sidebar_area);
    draw_main(f, app, main_area);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            APP_TITLE,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            APP_DESCRIPTION,
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    f.render_widget(header, area);
}

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let [key_area, info_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);

    let key_focused = app.focus == Focus::ApiKey;
    let key_field = Paragraph::new(app.masked_key()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(key_focused))
            .title(" API key "),
    );
    f.render_widget(key_field, key_area);
    if key_focused {
        let len = app.key_input.chars().count() as u16;
        let x = (key_area.x + 1 + len).min(key_area.right().saturating_sub(2));
        f.set_cursor_position(Position::new(x, key_area.y + 1));
    }

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let key_hint = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Tab    ", key_hint),
            Span::raw("Switch field"),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+L ", key_hint),
            Span::raw("Clear chat history"),
        ]),
        Line::from(""),
        Line::from(Span::styled("Model", heading)),
        Line::from(app.model_label.as_str()),
        Line::from(""),
        Line::from(Span::styled("Tools", heading)),
    ];
    if app.tool_names.is_empty() {
        lines.push(Line::from(Span::styled("(none)", dim)));
    }
    for name in &app.tool_names {
        lines.push(Line::from(format!("• {}", name)));
    }

    let info = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Settings "))
        .wrap(Wrap { trim: true });
    f.render_widget(info, info_area);
}

fn transcript_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines: Vec<Line<'_>> = Vec::new();
    for turn in app.controller.session().all() {
        let color = match turn.role {
            Role::User => Color::Green,
            Role::Assistant => Color::Cyan,
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", turn.role),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text_line in turn.text().lines() {
            lines.push(Line::from(text_line));
        }
        lines.push(Line::from(""));
    }

    if app.controller.is_processing() {
        let thought = Style::default().fg(Color::Yellow);
        for entry in &app.thoughts {
            lines.push(Line::from(Span::styled(entry.as_str(), thought)));
        }
        for text_line in app.streaming.lines() {
            lines.push(Line::from(Span::styled(
                text_line,
                Style::default().fg(Color::DarkGray),
            )));
        }
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        lines.push(Line::from(Span::styled(
            format!("{} Thinking...", spinner),
            thought,
        )));
    }
    lines
}

/// Rows `lines` take when wrapped to `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: usize) -> usize {
    lines
        .iter()
        .map(|l| l.width().div_ceil(width.max(1)).max(1))
        .sum()
}

fn draw_main(f: &mut Frame, app: &App, area: Rect) {
    let inner_width = area.width.saturating_sub(2).max(1) as usize;

    // Number of visual lines the input text occupies when wrapped
    let input_chars = app.input.chars().count();
    let visual_lines = input_chars.div_ceil(inner_width).max(1);

    // Cap at 40% of the area to protect the transcript
    let max_input_height = (area.height as usize * 2 / 5).max(3);
    let input_height = (visual_lines + 2).min(max_input_height) as u16;
    let notice_height = if app.controller.notice().is_some() { 1 } else { 0 };

    let [transcript_area, notice_area, input_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(notice_height),
        Constraint::Length(input_height),
    ])
    .areas(area);

    // --- Transcript, pinned to the bottom unless scrolled ---
    let lines = transcript_lines(app);
    let total = wrapped_height(&lines, inner_width);
    let visible = transcript_area.height.saturating_sub(2) as usize;
    let top = total
        .saturating_sub(visible)
        .saturating_sub(app.scroll_offset as usize);
    let transcript = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Chat "))
        .wrap(Wrap { trim: false })
        .scroll((top.min(u16::MAX as usize) as u16, 0));
    f.render_widget(transcript, transcript_area);

    if let Some(notice) = app.controller.notice() {
        let notice = Paragraph::new(Span::styled(
            notice,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(notice, notice_area);
    }

    // --- Input box ---
    let input_focused = app.focus == Focus::Input;
    let title = if app.controller.is_processing() {
        " searching... "
    } else {
        " > "
    };
    let content = if app.input.is_empty() {
        Line::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(app.input.as_str())
    };
    let input_widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused_border(input_focused))
                .title(title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(input_widget, input_area);

    if input_focused {
        // Place cursor at end of input text, accounting for line wrapping.
        let iw = (input_area.width.saturating_sub(2)).max(1) as usize;
        let cursor_x = input_area.x + 1 + (input_chars % iw) as u16;
        let cursor_y = input_area.y + 1 + (input_chars / iw) as u16;
        f.set_cursor_position(Position::new(
            cursor_x,
            cursor_y.min(input_area.bottom().saturating_sub(2)),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatController;
    use crate::session::Session;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn app() -> App {
        App::new(
            ChatController::new(Session::new("Hi, how can I help?")),
            "groq/llama-3.1-8b-instant".into(),
            vec!["search".into(), "wikipedia".into()],
            true,
        )
    }

    #[test]
    fn test_draws_greeting_placeholder_and_sidebar() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Hi, how can I help?"));
        assert!(text.contains(INPUT_PLACEHOLDER));
        assert!(text.contains("Settings"));
        assert!(text.contains("wikipedia"));
    }

    #[test]
    fn test_draws_notice_after_failure() {
        let mut app = app();
        app.input = "q".into();
        app.submit();
        app.finish_turn(Err(anyhow::anyhow!("no key")));

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("An error occurred: no key"));
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdef"), Line::from("")];
        assert_eq!(wrapped_height(&lines, 3), 3);
    }
}
