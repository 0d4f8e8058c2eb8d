//! Model resolution logic for sleuth.
//!
//! Resolves which provider and model to use based on CLI flags, config file,
//! and hardcoded defaults. Supports `provider/model` shorthand syntax.

use anyhow::Result;

use super::kind::{default_model_for, ProviderKind};
use crate::config::Config;

use crate::constants::DEFAULT_PROVIDER;

/// Resolved provider + model pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Resolve which provider and model to use.
/// Priority: CLI flags > config.toml > defaults.
///
/// Accepts these formats:
///   --model groq/llama-3.3-70b-versatile  (provider/model shorthand, only when --provider is omitted)
///   --provider openrouter --model "org/model-name"  (slash preserved as model name)
///   --provider openai --model gpt-4.1
///   --provider anthropic  (uses the provider's table model, then its default)
///   (nothing)  (uses config.toml, then hardcoded default)
pub fn resolve_model(
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    config: &Config,
) -> Result<ModelSelection> {
    // If --model contains a slash AND no explicit --provider, parse as provider/model shorthand
    if cli_provider.is_none() {
        if let Some(model_str) = cli_model {
            if let Some((prov, model)) = model_str.split_once('/') {
                if let Ok(provider) = ProviderKind::from_str(prov) {
                    return Ok(ModelSelection {
                        provider,
                        model: model.to_string(),
                    });
                }
            }
        }
    }

    let provider_str = cli_provider
        .or(config.provider_name())
        .unwrap_or(DEFAULT_PROVIDER);
    let provider = ProviderKind::from_str(provider_str)?;

    let model = cli_model
        .map(String::from)
        .or_else(|| config.provider_model(provider.name()))
        .or_else(|| config.model_name())
        .unwrap_or_else(|| default_model_for(&provider).to_string());

    Ok(ModelSelection { provider, model })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_groq() {
        let selection = resolve_model(None, None, &Config::default()).unwrap();
        assert_eq!(selection.provider, ProviderKind::Groq);
        assert_eq!(selection.model, crate::constants::DEFAULT_MODEL);
    }

    #[test]
    fn test_shorthand_and_explicit_provider() {
        let config = Config::default();
        let selection = resolve_model(None, Some("openai/gpt-4.1"), &config).unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenAI);
        assert_eq!(selection.model, "gpt-4.1");

        let selection =
            resolve_model(Some("openrouter"), Some("meta-llama/llama-3.1-8b-instruct"), &config)
                .unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenRouter);
        assert_eq!(selection.model, "meta-llama/llama-3.1-8b-instruct");

        let selection = resolve_model(Some("anthropic"), None, &config).unwrap();
        assert_eq!(selection.model, crate::constants::DEFAULT_ANTHROPIC_MODEL);
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        assert!(resolve_model(Some("nope"), None, &Config::default()).is_err());
    }
}
