//! Model listing and discovery.
//!
//! Displays suggested models grouped by provider, including dynamically
//! queried Ollama models. Isolates display concerns from the provider core.

use anyhow::Result;

use super::kind::ProviderKind;
use super::resolve::resolve_model;
use crate::config::Config;

/// Tool-calling capable models worth trying on each hosted provider.
const SUGGESTED: &[(ProviderKind, &[&str])] = &[
    (
        ProviderKind::Groq,
        &[
            "llama-3.1-8b-instant",
            "llama-3.3-70b-versatile",
            "openai/gpt-oss-20b",
            "qwen/qwen3-32b",
        ],
    ),
    (ProviderKind::OpenAI, &["gpt-4.1-mini", "gpt-4.1", "gpt-4o-mini"]),
    (
        ProviderKind::Anthropic,
        &["claude-sonnet-4-5", "claude-haiku-4-5"],
    ),
    (
        ProviderKind::OpenRouter,
        &["meta-llama/llama-3.1-8b-instruct", "openai/gpt-4.1-mini"],
    ),
];

/// List available models, grouped by provider. The active one is marked.
pub async fn list_models(config: &Config) -> Result<()> {
    let selection = resolve_model(None, None, config)?;
    let marker = |provider: ProviderKind, name: &str| {
        if provider == selection.provider && name == selection.model {
            " (current)"
        } else {
            ""
        }
    };

    println!("Available models:\n");

    for (provider, models) in SUGGESTED {
        println!("  {provider}:");
        for name in *models {
            println!("    {name}{}", marker(*provider, name));
        }
        println!();
    }

    // Ollama (dynamic)
    println!("  ollama:");
    match list_ollama_models(config).await {
        Ok(models) if models.is_empty() => {
            println!("    (no models found -- run `ollama pull llama3.1`)");
        }
        Ok(models) => {
            for model in &models {
                println!("    {model}{}", marker(ProviderKind::Ollama, model));
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "ollama model listing failed");
            println!("    (ollama not running)");
        }
    }

    Ok(())
}

/// Query Ollama's local API for available models.
async fn list_ollama_models(config: &Config) -> Result<Vec<String>> {
    let base_url = config
        .provider_base_url("ollama")
        .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);

    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::get(&url).await?.json().await?;

    Ok(model_names(&resp))
}

fn model_names(resp: &serde_json::Value) -> Vec<String> {
    resp["models"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|m| m["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_names_from_tags() {
        let resp = json!({"models": [{"name": "llama3.1:8b"}, {"name": "qwen3"}, {"size": 1}]});
        assert_eq!(model_names(&resp), vec!["llama3.1:8b", "qwen3"]);
        assert!(model_names(&json!({})).is_empty());
    }

    #[test]
    fn test_default_model_is_suggested_for_groq() {
        let (_, groq) = SUGGESTED
            .iter()
            .find(|(p, _)| *p == ProviderKind::Groq)
            .unwrap();
        assert!(groq.contains(&crate::constants::DEFAULT_MODEL));
    }
}
