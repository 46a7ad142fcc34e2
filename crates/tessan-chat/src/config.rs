//! Chat configuration with sensible defaults.
//!
//! [`ChatConfig`] captures what both binaries need and converts it into a
//! ready [`Chatbot`] via [`build_chatbot`](ChatConfig::build_chatbot).

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{GeminiClient, GeminiOptions, RetryConfig};
use crate::chat::Chatbot;
use crate::prompt::PromptSource;
use crate::{API_KEY_ENV, ConfigError};

/// Environment variable overriding the default model.
pub const MODEL_ENV: &str = "TESSAN_MODEL";

/// Load `.env` from the working directory, if present.
///
/// Variables already set in the process environment take precedence.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
    }
}

/// Read the Gemini API key from the environment.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

/// Accept a raw key value. Unset and blank values are both missing.
pub fn api_key_from(raw: Option<String>) -> Result<String, ConfigError> {
    raw.filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`](crate::DEFAULT_MODEL),
    /// or `TESSAN_MODEL` when set.
    pub model: String,
    /// Sampling temperature. Default: `0.7`.
    pub temperature: f32,
    /// Cap on reply length. Default: provider default.
    pub max_output_tokens: Option<u32>,
    /// Retry policy for transient failures. Default: no retries.
    pub retry: RetryConfig,
    /// Where the system instruction comes from. Default: first existing
    /// template candidate in the working directory.
    pub prompt: PromptSource,
}

impl Default for ChatConfig {
    fn default() -> Self {
        let model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| crate::DEFAULT_MODEL.to_string());
        Self {
            model,
            temperature: crate::DEFAULT_TEMPERATURE,
            max_output_tokens: None,
            retry: RetryConfig::default(),
            prompt: PromptSource::resolve(None, None, &PathBuf::from(".")),
        }
    }
}

impl ChatConfig {
    /// Build the Gemini client options from this config.
    pub fn gemini_options(&self) -> GeminiOptions {
        GeminiOptions {
            model: self.model.clone(),
            temperature: Some(self.temperature),
            max_output_tokens: self.max_output_tokens,
            ..Default::default()
        }
    }

    /// Build the Gemini HTTP client alone.
    pub fn build_client(&self, api_key: impl Into<String>) -> Result<GeminiClient, ConfigError> {
        GeminiClient::new(api_key, self.gemini_options())
    }

    /// Load the system instruction, then build a Gemini-backed [`Chatbot`].
    ///
    /// The prompt is read first so a missing template fails before any
    /// HTTP client exists.
    pub fn build_chatbot(&self, api_key: impl Into<String>) -> Result<Chatbot, ConfigError> {
        let instruction = self.prompt.load_instruction()?;
        let client = self.build_client(api_key)?;
        info!(
            "Chatbot ready: model={}, prompt={} ({:?}), retries={}",
            self.model,
            self.prompt.path.display(),
            self.prompt.mode,
            self.retry.max_retries
        );
        Ok(Chatbot::new(Arc::new(client), instruction).with_retry(self.retry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptMode;

    #[test]
    fn defaults_use_flash_sampling_without_retries() {
        let config = ChatConfig::default();
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.retry.max_retries, 0);
        assert!(config.max_output_tokens.is_none());
    }

    #[test]
    fn blank_or_unset_key_is_missing() {
        assert!(matches!(api_key_from(None), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            api_key_from(Some(String::new())),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            api_key_from(Some("  \t".into())),
            Err(ConfigError::MissingApiKey)
        ));
        assert_eq!(api_key_from(Some("AIza-test".into())).unwrap(), "AIza-test");
    }

    #[test]
    fn gemini_options_carry_sampling() {
        let config = ChatConfig {
            model: "gemini-test".into(),
            temperature: 0.2,
            max_output_tokens: Some(256),
            ..Default::default()
        };
        let options = config.gemini_options();
        assert_eq!(options.model, "gemini-test");
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options.max_output_tokens, Some(256));
    }

    #[test]
    fn build_chatbot_fails_on_missing_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChatConfig {
            prompt: PromptSource::new(PromptMode::YamlTemplate, dir.path().join("none.yaml")),
            ..Default::default()
        };
        assert!(matches!(
            config.build_chatbot("key").err(),
            Some(ConfigError::PromptNotFound { .. })
        ));
    }

    #[test]
    fn build_chatbot_renders_instruction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.yaml");
        std::fs::write(&path, "role: assistant\ntone: formal\n").unwrap();
        let config = ChatConfig {
            model: "gemini-test".into(),
            prompt: PromptSource::from_path(&path),
            ..Default::default()
        };

        let bot = config.build_chatbot("key").unwrap();
        assert_eq!(bot.model_name(), "gemini-test");
        assert!(bot.system_instruction().contains("[TON SOUHAITÉ]\nformal"));
    }
}
