//! Error types.
//!
//! Startup problems are [`ConfigError`]s and abort the process. Failures of a
//! single chat turn are [`ChatError`]s, split by what the caller should do
//! next: retry, report and continue, or stop.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{} environment variable not set", crate::API_KEY_ENV)]
    MissingApiKey,

    #[error("prompt file not found at {}", path.display())]
    PromptNotFound { path: PathBuf },

    #[error("failed to read prompt file {}: {source}", path.display())]
    PromptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse prompt template {}: {source}", path.display())]
    PromptParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("prompt file {} is empty", path.display())]
    EmptyPrompt { path: PathBuf },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Errors from a single chat turn.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Rate limits, server errors, timeouts, dropped connections. Retryable.
    #[error("transient error: {0}")]
    Transient(String),

    /// The request was refused or the reply was unusable. Not retryable, but
    /// the conversation can continue.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Bad credentials or unknown model. Further turns will fail the same way.
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl ChatError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, detail: impl AsRef<str>) -> Self {
        let message = format!("HTTP {status}: {}", detail.as_ref());
        match status.as_u16() {
            429 | 500 | 502 | 503 | 504 => ChatError::Transient(message),
            401 | 403 | 404 => ChatError::Fatal(message),
            _ if status.is_server_error() => ChatError::Transient(message),
            _ => ChatError::Rejected(message),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::Transient(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ChatError::Fatal(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ChatError::Rejected(format!("failed to decode response: {e}"))
        } else {
            // Timeouts, connect failures and body read errors.
            ChatError::Transient(format!("request failed: {e}"))
        }
    }
}
