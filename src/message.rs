//! Chat transcript types for sleuth.
//!
//! A transcript is an ordered list of [`ChatTurn`]s, each produced by either
//! the user or the assistant. These are sleuth's internal types; the agent
//! only ever sees the latest user prompt.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "you"),
            Role::Assistant => write!(f, "sleuth"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);

        let turn: ChatTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"hello"}"#).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.text(), "hello");
    }

    #[test]
    fn test_role_display_labels() {
        assert_eq!(Role::User.to_string(), "you");
        assert_eq!(Role::Assistant.to_string(), "sleuth");
    }
}
