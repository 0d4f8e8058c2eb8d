//! Entry point for tool-augmented LLM interaction.
//!
//! [`ReasoningAgent`] is the seam the chat controller drives: one input in,
//! one answer out, with thoughts reported to a [`Renderer`] on the way.
//! [`SearchAgent`] is the production implementation; the decide/act/observe
//! iteration itself is rig-core's `multi_turn()` streaming, reached through
//! [`Provider::stream_with_tools`].

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Instant;

use crate::config::Config;
use crate::constants::DEFAULT_SYSTEM_PROMPT;
use crate::output::Renderer;
use crate::provider::{ModelSelection, Provider};
use crate::tools::ToolRegistry;

/// Answers one question, reporting intermediate steps to `observer`.
#[async_trait(?Send)]
pub trait ReasoningAgent {
    async fn run(&self, input: &str, observer: &mut dyn Renderer) -> Result<String>;
}

/// Searches the web, Wikipedia, and arXiv to answer a question.
pub struct SearchAgent<'a> {
    provider: Provider,
    tools: &'a ToolRegistry,
    system_prompt: String,
    max_turns: usize,
    handle_parsing_errors: bool,
}

impl<'a> SearchAgent<'a> {
    /// Builds an agent for one turn.
    ///
    /// `session_key` is the key entered in the running session, if any. It
    /// wins over the environment and the config file.
    pub fn from_config(
        config: &Config,
        selection: &ModelSelection,
        session_key: Option<&str>,
        tools: &'a ToolRegistry,
    ) -> Result<Self> {
        let provider = Provider::from_config(config, selection, session_key)?;
        Ok(Self {
            provider,
            tools,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            max_turns: config.max_turns(),
            handle_parsing_errors: config.handle_parsing_errors(),
        })
    }
}

#[async_trait(?Send)]
impl ReasoningAgent for SearchAgent<'_> {
    async fn run(&self, input: &str, observer: &mut dyn Renderer) -> Result<String> {
        let started = Instant::now();
        tracing::info!(
            model = %self.provider.model(),
            tools = self.tools.len(),
            max_turns = self.max_turns,
            "agent turn started"
        );

        let answer = self
            .provider
            .stream_with_tools(
                input,
                &self.system_prompt,
                self.tools,
                self.handle_parsing_errors,
                observer,
                self.max_turns,
            )
            .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            bail!("Agent stopped without an answer");
        }

        tracing::info!(
            chars = answer.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "agent turn finished"
        );
        Ok(answer.to_string())
    }
}

/// Builds a fresh [`SearchAgent`] on every run.
///
/// The chat surfaces hold one of these per turn so a key entered with `/key`
/// (or in the TUI settings) applies from the next question on, and a missing
/// key fails that turn instead of the whole session.
pub struct TurnAgent<'a> {
    config: &'a Config,
    selection: &'a ModelSelection,
    tools: &'a ToolRegistry,
    session_key: Option<String>,
}

impl<'a> TurnAgent<'a> {
    pub fn new(
        config: &'a Config,
        selection: &'a ModelSelection,
        tools: &'a ToolRegistry,
        session_key: Option<&str>,
    ) -> Self {
        Self {
            config,
            selection,
            tools,
            session_key: session_key.map(str::to_string),
        }
    }
}

#[async_trait(?Send)]
impl ReasoningAgent for TurnAgent<'_> {
    async fn run(&self, input: &str, observer: &mut dyn Renderer) -> Result<String> {
        let agent = SearchAgent::from_config(
            self.config,
            self.selection,
            self.session_key.as_deref(),
            self.tools,
        )?;
        agent.run(input, observer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatController, TurnOutcome};
    use crate::provider::ProviderKind;
    use crate::session::Session;
    use crate::tools::tests::serve;
    use serde_json::Value;

    /// Counts everything the agent shows the user while a turn runs.
    #[derive(Default)]
    struct CountingRenderer {
        shown: usize,
    }

    impl Renderer for CountingRenderer {
        fn render_token(&mut self, _token: &str) {
            self.shown += 1;
        }
        fn render_done(&mut self) {
            self.shown += 1;
        }
        fn tool_start(&mut self, _name: &str, _args: &Value) {
            self.shown += 1;
        }
        fn tool_result(&mut self, _name: &str, _result: &str) {
            self.shown += 1;
        }
    }

    fn groq_at(base_url: &str) -> Config {
        toml::from_str(&format!(
            "[provider.groq]\napi_key = \"gsk_test\"\nbase_url = \"{base_url}\"\n"
        ))
        .unwrap()
    }

    #[test]
    fn test_session_key_builds_agent() {
        let config = Config::default();
        let selection = ModelSelection {
            provider: ProviderKind::OpenRouter,
            model: "meta-llama/llama-3.1-8b-instruct".into(),
        };
        let tools = ToolRegistry::new();
        let agent = SearchAgent::from_config(&config, &selection, Some("sk-or-test"), &tools);
        assert!(agent.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_request_surfaces_as_a_single_notice() {
        let base = serve(vec![(
            "",
            429,
            r#"{"error":{"message":"Rate limit reached"}}"#.to_string(),
        )]);
        let config = groq_at(&base);
        let selection = ModelSelection {
            provider: ProviderKind::Groq,
            model: "llama-3.1-8b-instant".into(),
        };
        let tools = ToolRegistry::new();
        let agent = TurnAgent::new(&config, &selection, &tools, None);
        let mut controller = ChatController::new(Session::new("Hi"));
        let mut renderer = CountingRenderer::default();

        let outcome = controller.run_turn("hello", &agent, &mut renderer).await;

        let notice = match outcome {
            Some(TurnOutcome::Failed(notice)) => notice,
            other => panic!("expected a failed turn, got {other:?}"),
        };
        assert!(notice.starts_with("An error occurred: "));
        assert_eq!(controller.notice(), Some(notice.as_str()));
        assert_eq!(renderer.shown, 0);
        assert_eq!(controller.session().len(), 2);
    }
}
