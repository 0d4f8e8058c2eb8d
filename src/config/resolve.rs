//! Environment variable substitution and API key resolution.

use super::types::{Config, ProviderEntry};

use crate::constants::DEFAULT_MAX_TURNS;

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = Self::resolve_str(&self.model);
        if let Some(ref mut sp) = self.system_prompt {
            *sp = Self::resolve_str(sp);
        }
        if let Some(ref mut dp) = self.default_provider {
            *dp = Self::resolve_str(dp);
        }
        Self::resolve_provider_entry(&mut self.provider.groq);
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.anthropic);
        Self::resolve_provider_entry(&mut self.provider.ollama);
        Self::resolve_provider_entry(&mut self.provider.openrouter);
        for tool in [
            &mut self.tools.search,
            &mut self.tools.wikipedia,
            &mut self.tools.arxiv,
        ] {
            if let Some(ref mut url) = tool.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    fn resolve_str(s: &str) -> String {
        Self::resolve_str_with(s, &env_lookup)
    }

    fn resolve_str_with(s: &str, env: &dyn Fn(&str) -> Option<String>) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let var_name = &result[start + 5..start + end];
            let value = env(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        }
        result
    }

    fn provider_entry(&self, provider: &str) -> Option<&ProviderEntry> {
        match provider {
            "groq" => self.provider.groq.as_ref(),
            "openai" => self.provider.openai.as_ref(),
            "anthropic" => self.provider.anthropic.as_ref(),
            "ollama" => self.provider.ollama.as_ref(),
            "openrouter" => self.provider.openrouter.as_ref(),
            _ => None,
        }
    }

    /// Resolve API key for a provider: `<PROVIDER>_API_KEY` as read through
    /// `env` first, then the config value.
    ///
    /// Empty strings (e.g. an unset `{env:VAR}` placeholder) count as missing.
    pub fn resolve_api_key_with(
        &self,
        provider: &str,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let env_key = format!("{}_API_KEY", provider.to_uppercase());
        if let Some(val) = env(&env_key) {
            if !val.is_empty() {
                return Some(val);
            }
        }

        self.provider_entry(provider)
            .and_then(|e| e.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    /// Custom base URL configured for a provider, if any.
    pub fn provider_base_url(&self, provider: &str) -> Option<&str> {
        self.provider_entry(provider)
            .and_then(|e| e.base_url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Get the model name from config, stripping provider prefix if present.
    /// Returns None if the model is the compile-time default (meaning user hasn't configured it).
    pub fn model_name(&self) -> Option<String> {
        let m = &self.model;
        if m == crate::constants::DEFAULT_MODEL {
            return None;
        }
        // If model contains slash, extract just the model part
        if let Some((_prov, model)) = m.split_once('/') {
            Some(model.to_string())
        } else {
            Some(m.to_string())
        }
    }

    /// Model configured inside a provider's own table, if any.
    pub fn provider_model(&self, provider: &str) -> Option<String> {
        self.provider_entry(provider).and_then(|e| e.model.clone())
    }

    /// A copy safe to print: every non-empty provider key is masked.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        for entry in [
            &mut copy.provider.groq,
            &mut copy.provider.openai,
            &mut copy.provider.anthropic,
            &mut copy.provider.ollama,
            &mut copy.provider.openrouter,
        ]
        .into_iter()
        .flatten()
        {
            if let Some(key) = entry.api_key.as_mut().filter(|k| !k.is_empty()) {
                *key = "********".to_string();
            }
        }
        copy
    }

    /// Maximum decide/act/observe round-trips per turn.
    pub fn max_turns(&self) -> usize {
        self.agent.max_turns.unwrap_or(DEFAULT_MAX_TURNS).max(1)
    }

    /// Whether malformed tool arguments are fed back to the model.
    pub fn handle_parsing_errors(&self) -> bool {
        self.agent.handle_parsing_errors.unwrap_or(true)
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "SLEUTH_TEST_SUBST" => Some("value".into()),
            "GROQ_API_KEY" => Some("gsk_from_env".into()),
            "OPENAI_API_KEY" => Some(String::new()),
            _ => None,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_str_substitutes_env() {
        assert_eq!(
            Config::resolve_str_with("a-{env:SLEUTH_TEST_SUBST}-b", &fake_env),
            "a-value-b"
        );
        assert_eq!(Config::resolve_str_with("{env:SLEUTH_TEST_UNSET_VAR}", &fake_env), "");
        assert_eq!(Config::resolve_str_with("{env:broken", &fake_env), "{env:broken");
    }

    #[test]
    fn test_env_key_wins_over_config_unless_blank() {
        let mut config = Config::default();
        config.provider.groq = Some(ProviderEntry {
            api_key: Some("gsk_from_config".into()),
            base_url: None,
            model: None,
        });
        config.provider.openai = Some(ProviderEntry {
            api_key: Some("sk-from-config".into()),
            base_url: None,
            model: None,
        });
        assert_eq!(
            config.resolve_api_key_with("groq", &fake_env).as_deref(),
            Some("gsk_from_env")
        );
        assert_eq!(
            config.resolve_api_key_with("openai", &fake_env).as_deref(),
            Some("sk-from-config")
        );
    }

    #[test]
    fn test_blank_config_key_counts_as_missing() {
        let mut config = Config::default();
        config.provider.openrouter = Some(ProviderEntry {
            api_key: Some(String::new()),
            base_url: None,
            model: None,
        });
        assert!(config.resolve_api_key_with("openrouter", &no_env).is_none());

        config.provider.openrouter = Some(ProviderEntry {
            api_key: Some("sk-or-test".into()),
            base_url: Some("https://proxy.example".into()),
            model: Some("meta-llama/llama-3.1-70b-instruct".into()),
        });
        assert_eq!(
            config
                .resolve_api_key_with("openrouter", &no_env)
                .as_deref(),
            Some("sk-or-test")
        );
        assert_eq!(
            config.provider_base_url("openrouter"),
            Some("https://proxy.example")
        );
        assert_eq!(
            config.provider_model("openrouter").as_deref(),
            Some("meta-llama/llama-3.1-70b-instruct")
        );
    }

    #[test]
    fn test_redacted_masks_keys_only() {
        let mut config = Config::default();
        config.provider.groq = Some(ProviderEntry {
            api_key: Some("gsk_secret".into()),
            base_url: Some("https://api.groq.com".into()),
            model: None,
        });
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("gsk_secret"));
        assert!(shown.contains("https://api.groq.com"));
        assert_eq!(
            config.provider.groq.unwrap().api_key.as_deref(),
            Some("gsk_secret")
        );
    }

    #[test]
    fn test_model_name_strips_provider_prefix() {
        let mut config = Config::default();
        assert!(config.model_name().is_none());

        config.model = "groq/llama-3.3-70b-versatile".into();
        assert_eq!(config.model_name().as_deref(), Some("llama-3.3-70b-versatile"));
    }
}
