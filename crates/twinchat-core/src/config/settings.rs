//! Settings model shared by every configuration source

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::traits::{ConfigError, ConfigResult};

/// Provider used when nothing is configured. Runs offline.
pub const DEFAULT_PROVIDER: &str = "mock";
/// Model used with the default provider
pub const DEFAULT_MODEL: &str = "portfolio-intent";

/// Top-level settings file
///
/// ```yaml
/// model:
///   provider: openai
///   model: gpt-4o-mini
///   temperature: 0.7
/// profile: ./me.yaml
/// logging:
///   level: debug
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Language model selection
    #[serde(default)]
    pub model: ModelSettings,

    /// Profile YAML to load instead of the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<PathBuf>,

    /// Log filter settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parse settings from YAML text and check their values
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render as YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values no provider could accept
    pub fn validate(&self) -> ConfigResult<()> {
        let model = &self.model;
        if model.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("model.provider must not be empty".into()));
        }
        if model.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model.model must not be empty".into()));
        }
        if let Some(t) = model.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "model.temperature must be within 0.0..=2.0, got {}",
                    t
                )));
            }
        }
        if model.max_tokens == Some(0) {
            return Err(ConfigError::Invalid("model.max_tokens must be positive".into()));
        }
        Ok(())
    }
}

/// Which model to talk to and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Provider name (`openai`, `anthropic`, `gemini`, `groq`, `ollama`, `mock`, ...)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name as the provider knows it
    #[serde(default = "default_model")]
    pub model: String,

    /// Custom API endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_base: None,
            api_key_env: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ModelSettings {
    /// Name of the environment variable the API key is read from
    ///
    /// Defaults to `<PROVIDER>_API_KEY`, e.g. `OPENAI_API_KEY`.
    pub fn api_key_env(&self) -> String {
        match &self.api_key_env {
            Some(name) => name.clone(),
            None => format!(
                "{}_API_KEY",
                self.provider.to_uppercase().replace(['-', ' '], "_")
            ),
        }
    }

    /// Model to request from the configured provider
    ///
    /// `portfolio-intent` only names the offline mock. Any other provider that
    /// was left on it gets `provider_default` instead.
    pub fn model_for(&self, provider_default: Option<&str>) -> String {
        let hosted = !self.provider.eq_ignore_ascii_case(DEFAULT_PROVIDER);
        match provider_default {
            Some(default) if hosted && self.model == DEFAULT_MODEL => default.to_string(),
            _ => self.model.clone(),
        }
    }

    /// Read the API key from the environment, if set and non-empty
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env())
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// Log filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `twinchat=debug`
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_level() -> String {
    "info".to_string()
}
