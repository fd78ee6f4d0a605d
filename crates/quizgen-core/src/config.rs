use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use secrecy::SecretString;

use crate::ai::openrouter::{DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_MODEL};

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV: &str = "QUIZGEN_MODEL";
pub const CHAT_URL_ENV: &str = "QUIZGEN_CHAT_URL";
pub const SCRIPT_URL_ENV: &str = "QUIZGEN_SCRIPT_URL";

/// Settings file contents. Every field is optional; environment variables win.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub model: Option<String>,
    pub chat_completions_url: Option<String>,
    pub script_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("quizgen").join("config.json"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Env,
    Config,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Env => "env",
            KeySource::Config => "config",
        }
    }
}

/// Effective settings after applying environment overrides to [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<SecretString>,
    pub api_key_source: Option<KeySource>,
    pub model: String,
    pub chat_completions_url: String,
    pub script_url: Option<String>,
}

impl Settings {
    pub fn resolve(config: &Config) -> Self {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup. Blank values count as unset.
    pub fn resolve_with(config: &Config, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let file = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        let (api_key, api_key_source) = match env(API_KEY_ENV) {
            Some(key) => (Some(key), Some(KeySource::Env)),
            None => match file(&config.openrouter_api_key) {
                Some(key) => (Some(key), Some(KeySource::Config)),
                None => (None, None),
            },
        };

        Self {
            api_key: api_key.map(SecretString::from),
            api_key_source,
            model: env(MODEL_ENV)
                .or_else(|| file(&config.model))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            chat_completions_url: env(CHAT_URL_ENV)
                .or_else(|| file(&config.chat_completions_url))
                .unwrap_or_else(|| DEFAULT_CHAT_COMPLETIONS_URL.to_string()),
            script_url: env(SCRIPT_URL_ENV).or_else(|| file(&config.script_url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::resolve_with(&Config::new(), lookup(&[]));

        assert!(settings.api_key.is_none());
        assert_eq!(settings.api_key_source, None);
        assert_eq!(settings.model, "openai/gpt-3.5-turbo");
        assert_eq!(
            settings.chat_completions_url,
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(settings.script_url, None);
    }

    #[test]
    fn environment_overrides_config_file() {
        let config = Config {
            openrouter_api_key: Some("from-file".into()),
            model: Some("file/model".into()),
            chat_completions_url: None,
            script_url: Some("https://file.example/exec".into()),
        };
        let settings = Settings::resolve_with(
            &config,
            lookup(&[
                (API_KEY_ENV, "from-env"),
                (SCRIPT_URL_ENV, "https://env.example/exec"),
            ]),
        );

        assert_eq!(
            settings.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("from-env".to_string())
        );
        assert_eq!(settings.api_key_source, Some(KeySource::Env));
        assert_eq!(settings.model, "file/model");
        assert_eq!(settings.script_url.as_deref(), Some("https://env.example/exec"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = Config {
            openrouter_api_key: Some("from-file".into()),
            ..Config::new()
        };
        let settings = Settings::resolve_with(&config, lookup(&[(API_KEY_ENV, "  ")]));

        assert_eq!(settings.api_key_source, Some(KeySource::Config));
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            openrouter_api_key: Some("sk-or-test".into()),
            script_url: Some("https://script.example/exec".into()),
            ..Config::new()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();

        assert_eq!(config, Config::new());
    }
}
