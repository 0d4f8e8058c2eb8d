//! Struct definitions and serde defaults for sleuth configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ARXIV_BASE_URL, DEFAULT_DOC_CONTENT_CHARS_MAX, DEFAULT_SEARCH_BASE_URL,
    DEFAULT_TOP_K_RESULTS, DEFAULT_WIKIPEDIA_LANG,
};

/// Root configuration for sleuth, deserialized from `config.toml`.
///
/// Fields use serde defaults so sleuth can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default model identifier (e.g. `"llama-3.1-8b-instant"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Default provider name (e.g., "groq", "openai").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Preamble given to the search agent.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,
    /// Assistant greeting shown in a fresh or cleared transcript.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Reasoning loop settings.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Search tool settings.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Returns the default model identifier.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization.
pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

pub(super) fn default_system_prompt() -> Option<String> {
    Some(crate::constants::DEFAULT_SYSTEM_PROMPT.to_string())
}

pub(super) fn default_greeting() -> String {
    crate::constants::DEFAULT_GREETING.to_string()
}

/// Provider-specific configuration map.
///
/// Each field corresponds to a supported LLM provider. Only providers
/// the user has configured will be `Some`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub groq: Option<ProviderEntry>,
    pub openai: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL for the provider's API (useful for proxies or self-hosted instances).
    pub base_url: Option<String>,
    /// Model identifier to use with this provider, overriding the global default.
    pub model: Option<String>,
}

/// Settings for the decide/act/observe loop.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentConfig {
    /// Maximum tool-calling round-trips per turn.
    pub max_turns: Option<usize>,
    /// Feed malformed tool arguments back to the model instead of failing the turn.
    pub handle_parsing_errors: Option<bool>,
}

/// Per-tool settings for the three search tools.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub search: ToolSettings,
    #[serde(default)]
    pub wikipedia: ToolSettings,
    #[serde(default)]
    pub arxiv: ToolSettings,
}

/// Limits and endpoint for one search tool.
///
/// Missing fields fall back to the tool's defaults when read through the
/// accessor methods, so a partial `[tools.arxiv]` table is fine.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ToolSettings {
    /// Whether the agent may call this tool.
    pub enabled: Option<bool>,
    /// Number of results fetched per call.
    pub top_k_results: Option<usize>,
    /// Characters of content returned per call.
    pub doc_content_chars_max: Option<usize>,
    /// Endpoint override (mirrors, proxies).
    pub base_url: Option<String>,
    /// Language edition (Wikipedia only).
    pub lang: Option<String>,
}

impl ToolSettings {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn top_k(&self) -> usize {
        self.top_k_results.unwrap_or(DEFAULT_TOP_K_RESULTS).max(1)
    }

    pub fn max_chars(&self) -> usize {
        self.doc_content_chars_max
            .unwrap_or(DEFAULT_DOC_CONTENT_CHARS_MAX)
    }

    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or(default)
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_WIKIPEDIA_LANG)
    }

    pub fn search_base_url(&self) -> &str {
        self.base_url_or(DEFAULT_SEARCH_BASE_URL)
    }

    pub fn arxiv_base_url(&self) -> &str {
        self.base_url_or(DEFAULT_ARXIV_BASE_URL)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: ProviderConfig::default(),
            default_provider: None,
            system_prompt: default_system_prompt(),
            greeting: default_greeting(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}
