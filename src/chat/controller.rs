//! Turn lifecycle shared by the REPL, the TUI, and `sleuth ask`.
//!
//! A turn goes Idle → Processing → Rendered. The user turn is recorded the
//! moment a prompt is submitted; the assistant turn only when the agent
//! answers. A failed turn records nothing but leaves a notice for display.

use anyhow::Result;

use crate::agent::ReasoningAgent;
use crate::constants::ERROR_NOTICE_PREFIX;
use crate::message::ChatTurn;
use crate::output::Renderer;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Processing,
    Rendered,
}

/// How a completed turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered(String),
    /// Carries the notice text shown to the user.
    Failed(String),
}

pub struct ChatController {
    session: Session,
    phase: Phase,
    notice: Option<String>,
}

impl ChatController {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            phase: Phase::Idle,
            notice: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Error notice from the last failed turn, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }

    /// Starts a turn. Returns the trimmed prompt, or `None` when the input is
    /// blank or a turn is already running.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        if self.phase == Phase::Processing {
            return None;
        }
        let prompt = input.trim();
        if prompt.is_empty() {
            return None;
        }
        self.acknowledge();
        self.session.append(ChatTurn::user(prompt));
        self.phase = Phase::Processing;
        tracing::debug!(turns = self.session.len(), "prompt submitted");
        Some(prompt.to_string())
    }

    /// Finishes the running turn with the agent's result.
    ///
    /// Returns `None` if no turn was running.
    pub fn complete(&mut self, result: Result<String>) -> Option<TurnOutcome> {
        if self.phase != Phase::Processing {
            return None;
        }
        self.phase = Phase::Rendered;
        match result {
            Ok(answer) => {
                self.session.append(ChatTurn::assistant(answer.clone()));
                Some(TurnOutcome::Answered(answer))
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "turn failed");
                let notice = format!("{}: {:#}", ERROR_NOTICE_PREFIX, e);
                self.notice = Some(notice.clone());
                Some(TurnOutcome::Failed(notice))
            }
        }
    }

    /// Submits `input`, runs `agent` on it, and records the result.
    pub async fn run_turn(
        &mut self,
        input: &str,
        agent: &dyn ReasoningAgent,
        observer: &mut dyn Renderer,
    ) -> Option<TurnOutcome> {
        let prompt = self.submit(input)?;
        let result = agent.run(&prompt, observer).await;
        self.complete(result)
    }

    /// Returns from Rendered to Idle and drops the notice.
    pub fn acknowledge(&mut self) {
        if self.phase == Phase::Rendered {
            self.phase = Phase::Idle;
        }
        self.notice = None;
    }

    /// Clears the transcript back to the greeting. Ignored mid-turn.
    pub fn reset(&mut self) -> bool {
        if self.phase == Phase::Processing {
            return false;
        }
        self.session.reset();
        self.notice = None;
        self.phase = Phase::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::cell::Cell;

    const GREETING: &str = "Hello there";

    #[derive(Default)]
    struct RecordingRenderer {
        tokens: String,
        tools: Vec<String>,
        observations: usize,
    }

    impl Renderer for RecordingRenderer {
        fn render_token(&mut self, token: &str) {
            self.tokens.push_str(token);
        }
        fn render_done(&mut self) {}
        fn tool_start(&mut self, name: &str, _args: &Value) {
            self.tools.push(name.to_string());
        }
        fn tool_result(&mut self, _name: &str, _result: &str) {
            self.observations += 1;
        }
    }

    /// Looks up the question once with the search tool, then answers.
    struct CannedAgent {
        answer: &'static str,
        calls: Cell<usize>,
    }

    impl CannedAgent {
        fn new(answer: &'static str) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl ReasoningAgent for CannedAgent {
        async fn run(&self, input: &str, observer: &mut dyn Renderer) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            observer.tool_start("search", &json!({ "query": input }));
            observer.tool_result("search", "some snippet");
            observer.render_token(self.answer);
            Ok(self.answer.to_string())
        }
    }

    struct FailingAgent;

    #[async_trait(?Send)]
    impl ReasoningAgent for FailingAgent {
        async fn run(&self, _input: &str, _observer: &mut dyn Renderer) -> Result<String> {
            Err(anyhow!("rate limit exceeded"))
        }
    }

    fn controller() -> ChatController {
        ChatController::new(Session::new(GREETING))
    }

    #[test]
    fn test_reset_leaves_only_the_greeting() {
        let mut c = controller();
        c.submit("first");
        c.complete(Ok("answer".into()));
        c.submit("second");
        c.complete(Err(anyhow!("boom")));

        assert!(c.reset());
        assert_eq!(c.session().all(), &[ChatTurn::assistant(GREETING)]);
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.notice().is_none());
    }

    #[test]
    fn test_submit_appends_user_turn_before_any_answer() {
        let mut c = controller();
        assert_eq!(c.submit("  what is rust?  ").as_deref(), Some("what is rust?"));
        assert_eq!(c.phase(), Phase::Processing);
        assert_eq!(c.session().len(), 2);
        assert_eq!(c.session().all()[1], ChatTurn::user("what is rust?"));
    }

    #[test]
    fn test_blank_submit_changes_nothing() {
        let mut c = controller();
        assert!(c.submit("   ").is_none());
        assert_eq!(c.session().len(), 1);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_submit_ignored_while_processing() {
        let mut c = controller();
        c.submit("one");
        assert!(c.submit("two").is_none());
        assert_eq!(c.session().len(), 2);
        assert!(!c.reset());
        assert_eq!(c.session().len(), 2);
    }

    #[test]
    fn test_complete_without_running_turn_is_ignored() {
        let mut c = controller();
        assert!(c.complete(Ok("stray".into())).is_none());
        assert_eq!(c.session().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_turn_appends_one_assistant_turn() {
        let mut c = controller();
        let agent = CannedAgent::new("Rust is a systems language.");
        let mut observer = RecordingRenderer::default();

        let outcome = c.run_turn("what is rust?", &agent, &mut observer).await;

        assert_eq!(
            outcome,
            Some(TurnOutcome::Answered("Rust is a systems language.".into()))
        );
        assert_eq!(agent.calls.get(), 1);
        assert_eq!(c.session().len(), 3);
        let last = c.session().last_of(Role::Assistant).unwrap();
        assert_eq!(last.text(), "Rust is a systems language.");
        assert_eq!(observer.tools, vec!["search"]);
        assert_eq!(observer.observations, 1);
        assert_eq!(c.phase(), Phase::Rendered);
    }

    #[tokio::test]
    async fn test_failed_turn_shows_one_notice_and_keeps_user_turn() {
        let mut c = controller();
        let mut observer = RecordingRenderer::default();

        let outcome = c.run_turn("what is rust?", &FailingAgent, &mut observer).await;

        let notice = "An error occurred: rate limit exceeded";
        assert_eq!(outcome, Some(TurnOutcome::Failed(notice.into())));
        assert_eq!(c.notice(), Some(notice));
        let turns = c.session().all();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], ChatTurn::user("what is rust?"));

        // The session stays usable and the notice goes away with the next turn.
        let agent = CannedAgent::new("ok");
        c.run_turn("again", &agent, &mut observer).await;
        assert!(c.notice().is_none());
        assert_eq!(c.session().len(), 4);
    }

    #[tokio::test]
    async fn test_turns_keep_insertion_order_without_dedup() {
        let mut c = controller();
        let agent = CannedAgent::new("same");
        let mut observer = RecordingRenderer::default();

        c.run_turn("same", &agent, &mut observer).await;
        c.run_turn("same", &agent, &mut observer).await;

        let roles: Vec<Role> = c.session().all().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
        assert!(c.session().all()[1..].iter().all(|t| t.text() == "same"));
    }
}
