//! File loading and merging for sleuth configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{
    default_greeting, default_model, default_system_prompt, AgentConfig, Config, ProviderConfig, ToolSettings,
    ToolsConfig,
};

/// Written to `~/.config/sleuth/config.toml` on first run.
const DEFAULT_CONFIG_TOML: &str = r#"default_provider = "groq"

[agent]
max_turns = 15
handle_parsing_errors = true

[tools.search]
top_k_results = 1
doc_content_chars_max = 200

[tools.wikipedia]
top_k_results = 1
doc_content_chars_max = 200
lang = "en"

[tools.arxiv]
top_k_results = 1
doc_content_chars_max = 200

[provider.groq]
api_key = "{env:GROQ_API_KEY}"

[provider.openai]
api_key = "{env:OPENAI_API_KEY}"

[provider.anthropic]
api_key = "{env:ANTHROPIC_API_KEY}"

[provider.openrouter]
api_key = "{env:OPENROUTER_API_KEY}"

[provider.ollama]
base_url = "http://localhost:11434"
"#;

impl Config {
    /// Loads the global config from `~/.config/sleuth/config.toml`.
    ///
    /// If no config file exists, creates one with sensible defaults
    /// (including `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = format!("model = \"{}\"\n{}", default_model(), DEFAULT_CONFIG_TOML);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "wrote default config");
            return Self::parse(&default_toml).context("Failed to parse default config");
        }

        Self::load_file(&path)
    }

    /// Look for sleuth.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::load_file(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    pub(super) fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            provider: ProviderConfig {
                groq: project.provider.groq.or(global.provider.groq),
                openai: project.provider.openai.or(global.provider.openai),
                anthropic: project.provider.anthropic.or(global.provider.anthropic),
                ollama: project.provider.ollama.or(global.provider.ollama),
                openrouter: project.provider.openrouter.or(global.provider.openrouter),
            },
            default_provider: project.default_provider.or(global.default_provider),
            system_prompt: if project.system_prompt != default_system_prompt() {
                project.system_prompt
            } else {
                global.system_prompt
            },
            greeting: if project.greeting != default_greeting() {
                project.greeting
            } else {
                global.greeting
            },
            agent: AgentConfig {
                max_turns: project.agent.max_turns.or(global.agent.max_turns),
                handle_parsing_errors: project
                    .agent
                    .handle_parsing_errors
                    .or(global.agent.handle_parsing_errors),
            },
            tools: ToolsConfig {
                search: merge_tool(global.tools.search, project.tools.search),
                wikipedia: merge_tool(global.tools.wikipedia, project.tools.wikipedia),
                arxiv: merge_tool(global.tools.arxiv, project.tools.arxiv),
            },
        }
    }
}

fn merge_tool(global: ToolSettings, project: ToolSettings) -> ToolSettings {
    ToolSettings {
        enabled: project.enabled.or(global.enabled),
        top_k_results: project.top_k_results.or(global.top_k_results),
        doc_content_chars_max: project.doc_content_chars_max.or(global.doc_content_chars_max),
        base_url: project.base_url.or(global.base_url),
        lang: project.lang.or(global.lang),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_template_parses() {
        let config = Config::parse(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.default_provider.as_deref(), Some("groq"));
        assert_eq!(config.max_turns(), 15);
        assert!(config.handle_parsing_errors());
        assert_eq!(config.tools.arxiv.top_k(), 1);
        assert_eq!(config.tools.wikipedia.max_chars(), 200);
        assert_eq!(config.tools.wikipedia.lang(), "en");
        assert!(config.provider.groq.is_some());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.model, default_model());
        assert_eq!(config.greeting, default_greeting());
        assert!(config.tools.search.is_enabled());
        assert_eq!(config.tools.search.top_k(), 1);
        assert_eq!(config.tools.search.max_chars(), 200);
        assert!(config.system_prompt.is_some());
        assert_eq!(config.max_turns(), 15);
        assert!(config.handle_parsing_errors());
    }

    #[test]
    fn test_project_tool_settings_override_global() {
        let global = Config::parse(DEFAULT_CONFIG_TOML).unwrap();
        let project = Config::parse(
            r#"
greeting = "Ask away."

[agent]
max_turns = 4
handle_parsing_errors = false

[tools.arxiv]
doc_content_chars_max = 500
enabled = false
"#,
        )
        .unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.greeting, "Ask away.");
        assert_eq!(merged.max_turns(), 4);
        assert!(!merged.handle_parsing_errors());
        assert_eq!(merged.tools.arxiv.max_chars(), 500);
        assert_eq!(merged.tools.arxiv.top_k(), 1);
        assert!(!merged.tools.arxiv.is_enabled());
        assert_eq!(merged.tools.wikipedia.lang(), "en");
        assert_eq!(merged.default_provider.as_deref(), Some("groq"));
    }

    #[test]
    fn test_project_defaults_do_not_mask_global_values() {
        let global = Config::parse(
            r#"
system_prompt = "Answer in German."

[tools.wikipedia]
lang = "de"
"#,
        )
        .unwrap();
        let project = Config::parse("default_provider = \"openai\"").unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.system_prompt.as_deref(), Some("Answer in German."));
        assert_eq!(merged.tools.wikipedia.lang(), "de");
        assert_eq!(merged.default_provider.as_deref(), Some("openai"));
    }
}
