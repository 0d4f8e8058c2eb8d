//! In-memory chat session for sleuth.
//!
//! A [`Session`] owns the transcript of one run of the app together with the
//! API key the user typed for it. Nothing here touches the disk: closing the
//! app discards the session.

use crate::message::ChatTurn;
#[cfg(test)]
use crate::message::Role;

/// An active conversation session.
///
/// The transcript is append-only apart from [`Session::reset`], which puts it
/// back to a single assistant greeting.
pub struct Session {
    turns: Vec<ChatTurn>,
    greeting: String,
    api_key: Option<String>,
}

impl Session {
    /// Creates a session whose transcript holds only the greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            turns: vec![ChatTurn::assistant(greeting.clone())],
            greeting,
            api_key: None,
        }
    }

    /// Appends a turn at the end of the transcript.
    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Replaces the transcript with a single assistant greeting.
    ///
    /// The session's API key is kept.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(ChatTurn::assistant(self.greeting.clone()));
    }

    /// All turns in insertion order.
    pub fn all(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// The most recent turn by the given role, if any.
    #[cfg(test)]
    pub fn last_of(&self, role: Role) -> Option<&ChatTurn> {
        self.turns.iter().rev().find(|t| t.role == role)
    }

    /// Stores the API key for this session. Blank input clears it.
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        self.api_key = if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        };
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("turns", &self.turns)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: &str = "Hello there";

    #[test]
    fn test_new_session_holds_only_greeting() {
        let session = Session::new(GREETING);
        assert_eq!(session.all(), &[ChatTurn::assistant(GREETING)]);
    }

    #[test]
    fn test_reset_yields_single_greeting() {
        let mut session = Session::new(GREETING);
        session.append(ChatTurn::user("one"));
        session.append(ChatTurn::assistant("two"));
        session.append(ChatTurn::user("three"));

        session.reset();
        assert_eq!(session.len(), 1);
        assert_eq!(session.all()[0].role, Role::Assistant);
        assert_eq!(session.all()[0].content, GREETING);

        // Resetting twice changes nothing.
        session.reset();
        assert_eq!(session.all(), &[ChatTurn::assistant(GREETING)]);
    }

    #[test]
    fn test_turns_keep_insertion_order_and_duplicates() {
        let mut session = Session::new(GREETING);
        session.append(ChatTurn::user("same"));
        session.append(ChatTurn::user("same"));
        session.append(ChatTurn::assistant("reply"));

        let contents: Vec<&str> = session.all().iter().map(|t| t.text()).collect();
        assert_eq!(contents, vec![GREETING, "same", "same", "reply"]);
        assert_eq!(session.last_of(Role::User).unwrap().text(), "same");
        assert_eq!(session.last_of(Role::Assistant).unwrap().text(), "reply");
    }

    #[test]
    fn test_api_key_survives_reset_and_blank_clears() {
        let mut session = Session::new(GREETING);
        assert!(session.api_key().is_none());

        session.set_api_key("  gsk_secret  ");
        assert_eq!(session.api_key(), Some("gsk_secret"));

        session.reset();
        assert_eq!(session.api_key(), Some("gsk_secret"));

        session.set_api_key("   ");
        assert!(session.api_key().is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut session = Session::new(GREETING);
        session.set_api_key("gsk_secret");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
