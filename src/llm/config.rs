//! Generative backend configuration

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generative backend kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini (generateContent API)
    Gemini,
    /// OpenAI or any chat-completions compatible endpoint
    OpenAI,
}

/// Generative backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider
    pub provider: LlmProvider,
    /// API key
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,
    /// API base URL override
    pub endpoint: Option<String>,
    /// Model name
    pub default_model: String,
    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: usize,
}

fn default_timeout() -> u64 {
    30
}

// SQL generation wants determinism more than creativity
fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> usize {
    512
}

impl LlmConfig {
    /// Gemini settings
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            endpoint: None,
            default_model: model.into(),
            timeout_secs: default_timeout(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
        }
    }

    /// OpenAI settings
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            endpoint: None,
            default_model: model.into(),
            timeout_secs: default_timeout(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
        }
    }

    /// Sets a custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Exposes the API key
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// Base URL for the provider, honoring the endpoint override
    pub fn base_url(&self) -> String {
        let default = match self.provider {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
        };

        self.endpoint
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// Validates the settings
    pub fn validate(&self) -> LlmResult<()> {
        if self.get_api_key().map_or(true, str::is_empty) {
            return Err(LlmError::ConfigError(format!(
                "API key is required for {:?}",
                self.provider
            )));
        }

        if self.default_model.trim().is_empty() {
            return Err(LlmError::ConfigError("model must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(LlmError::ConfigError(
                "Temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.default_max_tokens == 0 || self.default_max_tokens > 100_000 {
            return Err(LlmError::ConfigError(
                "max_tokens must be between 1 and 100000".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(LlmError::ConfigError(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_config() {
        let config = LlmConfig::gemini("test-key", "gemini-pro");
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.default_model, "gemini-pro");
        assert_eq!(config.get_api_key(), Some("test-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let mut config = LlmConfig::gemini("", "gemini-pro");
        assert!(config.validate().is_err());
        config.api_key = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_temperature() {
        let mut config = LlmConfig::openai("test-key", "gpt-4o-mini");
        config.default_temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_max_tokens() {
        let mut config = LlmConfig::openai("test-key", "gpt-4o-mini");
        config.default_max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url() {
        let config = LlmConfig::gemini("k", "gemini-pro");
        assert_eq!(
            config.base_url(),
            "https://generativelanguage.googleapis.com/v1beta"
        );

        let config = LlmConfig::openai("k", "local").with_endpoint("http://localhost:8080/v1/");
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = LlmConfig::gemini("super-secret", "gemini-pro");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
