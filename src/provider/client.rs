//! LLM provider client and streaming implementation.
//!
//! Contains the [`Provider`] struct which wraps rig-core provider clients
//! behind enum dispatch, keeping provider-specific details out of the agent
//! layer. Supports Groq, OpenAI, Anthropic, OpenRouter, and Ollama.

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use rig::agent::MultiTurnStreamItem;
use rig::client::CompletionClient;
use rig::message::Text;
use rig::providers::{anthropic, groq, openai, openrouter};
use rig::streaming::{StreamedAssistantContent, StreamedUserContent, StreamingPrompt};

use std::collections::HashMap;

use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::config::Config;
use crate::output::Renderer;
use crate::tools::ToolRegistry;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Groq(groq::Client),
    OpenAI(openai::Client),
    Anthropic(anthropic::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to handle completion requests.
///
/// Agents are constructed on each call since they are cheap to create and
/// carry the tool set of the turn that builds them.
pub struct Provider {
    client: ClientKind,
    model: String,
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Groq($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

/// Builds an agent with tools registered for LLM function calling.
macro_rules! with_agent_tools {
    ($client:expr, $model:expr, $sys:expr, $rig_tools:expr, |$agent:ident| $body:expr) => {{
        let $agent = $client
            .agent($model)
            .preamble($sys)
            .max_tokens(crate::constants::MAX_TOKENS)
            .tools($rig_tools)
            .build();
        $body
    }};
}

/// Builds a keyed client, honoring a base URL override when one is configured.
macro_rules! keyed_client {
    ($module:ident, $key:expr, $base_url:expr) => {
        match $base_url {
            Some(url) => $module::Client::builder()
                .api_key($key)
                .base_url(url.to_string())
                .build(),
            None => $module::Client::new($key),
        }
    };
}

/// Picks the key for `kind`: session entry, then env var, then config file.
fn api_key(config: &Config, kind: ProviderKind, session_key: Option<&str>) -> Result<String> {
    api_key_with(config, kind, session_key, &|name: &str| std::env::var(name).ok())
}

fn api_key_with(
    config: &Config,
    kind: ProviderKind,
    session_key: Option<&str>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<String> {
    session_key
        .map(str::to_string)
        .or_else(|| config.resolve_api_key_with(kind.name(), env))
        .ok_or_else(|| {
            anyhow!(
                "No API key found for {kind}. Enter one with /key, set {}_API_KEY, or configure it in config.toml",
                kind.name().to_uppercase()
            )
        })
}

/// Processes a multi-turn streaming response where rig-core drives tool execution.
///
/// - `StreamAssistantItem(Text)` → render token + accumulate text
/// - `StreamAssistantItem(ToolCall)` → render tool start, drop the text so far
/// - `StreamUserItem(ToolResult)` → render the observation
/// - `FinalResponse` → stream complete
///
/// Text streamed before a tool call is the model thinking aloud; only text
/// after the last observation is the answer.
macro_rules! process_stream_with_tools {
    ($stream:expr, $renderer:expr, $full_response:expr, $tool_names:expr) => {
        while let Some(chunk) = $stream.next().await {
            match chunk {
                Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(
                    Text { text },
                ))) => {
                    $renderer.render_token(&text);
                    $full_response.push_str(&text);
                }
                Ok(MultiTurnStreamItem::StreamAssistantItem(
                    StreamedAssistantContent::ToolCall {
                        tool_call,
                        internal_call_id,
                    },
                )) => {
                    let name = tool_call.function.name.clone();
                    $renderer.tool_start(&name, &tool_call.function.arguments);
                    $full_response.clear();
                    $tool_names.insert(internal_call_id, name);
                }
                Ok(MultiTurnStreamItem::StreamUserItem(StreamedUserContent::ToolResult {
                    tool_result,
                    internal_call_id,
                })) => {
                    let name = $tool_names
                        .get(&internal_call_id)
                        .map(|s| s.as_str())
                        .unwrap_or("unknown");
                    let result_text: String = tool_result
                        .content
                        .into_iter()
                        .filter_map(|c| match c {
                            rig::message::ToolResultContent::Text(t) => Some(t.text),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    $renderer.tool_result(name, &result_text);
                }
                Ok(MultiTurnStreamItem::FinalResponse(_)) => {}
                Err(err) => anyhow::bail!("{}", err),
                _ => {
                    // ToolCallDelta, Reasoning, etc.
                }
            }
        }
    };
}

impl Provider {
    /// Creates a new [`Provider`] for the selected backend.
    ///
    /// `session_key` is a key entered during the session; it takes precedence
    /// over `<PROVIDER>_API_KEY` and the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(
        config: &Config,
        selection: &ModelSelection,
        session_key: Option<&str>,
    ) -> Result<Self> {
        let kind = selection.provider;
        let base_url = config.provider_base_url(kind.name());

        let client = match kind {
            ProviderKind::Groq => ClientKind::Groq(
                keyed_client!(groq, &api_key(config, kind, session_key)?, base_url)
                    .context("Failed to create Groq client")?,
            ),
            ProviderKind::OpenAI => ClientKind::OpenAI(
                keyed_client!(openai, &api_key(config, kind, session_key)?, base_url)
                    .context("Failed to create OpenAI client")?,
            ),
            ProviderKind::Anthropic => ClientKind::Anthropic(
                keyed_client!(anthropic, &api_key(config, kind, session_key)?, base_url)
                    .context("Failed to create Anthropic client")?,
            ),
            ProviderKind::OpenRouter => ClientKind::OpenRouter(
                keyed_client!(openrouter, &api_key(config, kind, session_key)?, base_url)
                    .context("Failed to create OpenRouter client")?,
            ),
            ProviderKind::Ollama => {
                let base_url = base_url.unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                ClientKind::Ollama(
                    openai::Client::builder()
                        .api_key("ollama")
                        .base_url(format!("{}/v1", base_url.trim_end_matches('/')))
                        .build()
                        .context("Failed to create Ollama client")?,
                )
            }
        };

        tracing::debug!(provider = %kind, model = %selection.model, "provider client ready");
        Ok(Self {
            client,
            model: selection.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Streams a multi-turn response with tool execution driven by rig-core.
    ///
    /// rig-core executes tool calls and feeds observations back to the model
    /// until it answers or `max_turns` round-trips are used up; sleuth
    /// subscribes to the stream purely for rendering. Returns the answer text.
    pub async fn stream_with_tools(
        &self,
        prompt: &str,
        system_prompt: &str,
        tools: &ToolRegistry,
        handle_parsing_errors: bool,
        renderer: &mut dyn Renderer,
        max_turns: usize,
    ) -> Result<String> {
        let mut full_response = String::new();
        let mut tool_names: HashMap<String, String> = HashMap::new();

        dispatch!(self, |client| {
            // Build rig_tools inside dispatch! so each match arm gets a fresh Vec
            let rig_tools = tools.to_rig_tools(handle_parsing_errors);
            let mut stream =
                with_agent_tools!(client, &self.model, system_prompt, rig_tools, |agent| {
                    agent.stream_prompt(prompt).multi_turn(max_turns).await
                });
            process_stream_with_tools!(stream, renderer, full_response, tool_names);
        });

        renderer.render_done();
        Ok(full_response)
    }
}
