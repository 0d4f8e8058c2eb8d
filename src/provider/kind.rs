//! Provider kind enumeration and default model mapping.
//!
//! Defines [`ProviderKind`] which identifies which LLM backend to use,
//! and [`default_model_for`] which returns the default model for each provider.

use anyhow::{anyhow, Result};

/// Identifies which LLM provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Groq (hosted open-weight models, the default).
    Groq,
    /// OpenAI (GPT models, via the Responses API).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
    /// OpenRouter (multi-provider gateway).
    OpenRouter,
    /// Ollama (local models via OpenAI-compatible API).
    Ollama,
}

impl ProviderKind {
    /// Parses a provider name string into a [`ProviderKind`].
    ///
    /// Matching is case-insensitive. Returns an error for unknown providers.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!(
                "Unknown provider: {other}. Supported: groq, openai, anthropic, openrouter, ollama"
            )),
        }
    }

    /// Lowercase name used in config tables and `<NAME>_API_KEY` variables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }

    /// Whether requests need an API key.
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the default model identifier for a given provider.
pub fn default_model_for(provider: &ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Groq => crate::constants::DEFAULT_MODEL,
        ProviderKind::OpenAI => crate::constants::DEFAULT_OPENAI_MODEL,
        ProviderKind::Anthropic => crate::constants::DEFAULT_ANTHROPIC_MODEL,
        ProviderKind::OpenRouter => crate::constants::DEFAULT_OPENROUTER_MODEL,
        ProviderKind::Ollama => crate::constants::OLLAMA_DEFAULT_MODEL,
    }
}
