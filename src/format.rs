//! Terminal formatting for transcript turns.

use colored::Colorize;

use crate::message::{ChatTurn, Role};

/// Format a turn for terminal display with role label and colors.
pub fn format_turn(turn: &ChatTurn) -> String {
    let label = format_role_label(turn.role);
    let body = match turn.role {
        Role::User => turn.text().to_string(),
        Role::Assistant => render_markdown_lite(turn.text()),
    };
    format!("{}\n{}", label, body)
}

fn format_role_label(role: Role) -> String {
    let label = format!("{}:", role);
    match role {
        Role::User => format!("{}", label.green().bold()),
        Role::Assistant => format!("{}", label.cyan().bold()),
    }
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the patterns that show up in search answers:
/// bold, inline code, fenced code blocks, bullet lists, and links.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            if in_code_block {
                let lang = line.trim_start().trim_start_matches('`');
                if !lang.is_empty() {
                    output.push_str(&format!("  {}\n", lang.dimmed()));
                }
            } else {
                output.push('\n');
            }
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
            continue;
        }

        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let rendered = match trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            Some(item) => format!("{}• {}", indent, render_inline(item)),
            None => render_inline(line),
        };
        output.push_str(&rendered);
        output.push('\n');
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold**, `inline code`, and [links](url) within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        if i + 1 < len && chars[i] == '*' && chars[i + 1] == '*' {
            if let Some(end) = find_closing(&chars, i + 2, "**") {
                let bold_text: String = chars[i + 2..end].iter().collect();
                result.push_str(&bold_text.bold().to_string());
                i = end + 2;
                continue;
            }
        }

        if chars[i] == '`' {
            if let Some(end) = find_closing_char(&chars, i + 1, '`') {
                let code_text: String = chars[i + 1..end].iter().collect();
                result.push_str(&code_text.dimmed().to_string());
                i = end + 1;
                continue;
            }
        }

        if chars[i] == '[' {
            if let Some((text, url, next)) = parse_link(&chars, i) {
                result.push_str(&format!("{} ({})", text.underline(), url.dimmed()));
                i = next;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

/// Parses `[text](url)` starting at `start`; returns the parts and the index after `)`.
fn parse_link(chars: &[char], start: usize) -> Option<(String, String, usize)> {
    let close = find_closing_char(chars, start + 1, ']')?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let end = find_closing_char(chars, close + 2, ')')?;
    let text: String = chars[start + 1..close].iter().collect();
    let url: String = chars[close + 2..end].iter().collect();
    Some((text, url, end + 1))
}

fn find_closing(chars: &[char], start: usize, pattern: &str) -> Option<usize> {
    let pat: Vec<char> = pattern.chars().collect();
    (start..=chars.len().saturating_sub(pat.len()))
        .find(|&i| i + pat.len() <= chars.len() && chars[i..i + pat.len()] == pat[..])
}

fn find_closing_char(chars: &[char], start: usize, ch: char) -> Option<usize> {
    (start..chars.len()).find(|&i| chars[i] == ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> String {
        colored::control::set_override(false);
        render_markdown_lite(text)
    }

    #[test]
    fn test_inline_markup_is_stripped_when_uncolored() {
        assert_eq!(plain("**Rust** is `fast`"), "Rust is fast");
        assert_eq!(plain("a ** dangling"), "a ** dangling");
    }

    #[test]
    fn test_bullets_and_links() {
        assert_eq!(
            plain("- see [Rust](https://www.rust-lang.org)\n  * nested"),
            "• see Rust (https://www.rust-lang.org)\n  • nested"
        );
        assert_eq!(plain("[not a link] here"), "[not a link] here");
    }

    #[test]
    fn test_code_block_is_indented() {
        assert_eq!(plain("```\nfn main() {}\n```"), "  fn main() {}\n");
    }

    #[test]
    fn test_format_turn_labels_role() {
        colored::control::set_override(false);
        assert_eq!(format_turn(&ChatTurn::user("hi")), "you:\nhi");
        assert_eq!(format_turn(&ChatTurn::assistant("**hey**")), "sleuth:\nhey");
    }
}
