//! Gemini-backed chat client for the Tessan medical assistant.
//!
//! `tessan-chat` forwards user text to the Google Gemini
//! [`generateContent`](https://ai.google.dev/api/generate-content) API and
//! returns the reply. The library is shared by the `tessan` terminal CLI and
//! the `tessan-web` browser UI.
//!
//! # Getting started
//!
//! ```ignore
//! use tessan_chat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChatConfig::default();
//!     let chatbot = config.build_chatbot(api_key_from_env()?)?;
//!
//!     let mut store = SessionStore::new();
//!     let history = store.get_or_create("cli");
//!     let reply = chatbot.send(history, "J'ai de la fièvre").await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **System instruction:** [`prompt::PromptSource`] picks between a plain
//!   text prompt and a YAML [`PromptTemplate`](prompt::PromptTemplate), which
//!   renders to the bracketed-section format the model expects.
//! - **Conversation memory:** [`session::SessionStore`] maps session ids to
//!   [`ConversationHistory`](session::ConversationHistory) values.
//! - **Calling the model:** [`chat::Chatbot`] wraps any
//!   [`ChatModel`](chat::ChatModel); [`api::gemini::GeminiClient`] is the
//!   production implementation. Transient failures are retried per
//!   [`RetryConfig`](api::RetryConfig).
//! - **Terminal loop:** [`repl::Repl`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Gemini HTTP client, error classification, retry with backoff |
//! | [`prompt`] | Template loading, prompt-source modes, instruction rendering |
//! | [`session`] | Per-session conversation histories |
//! | [`chat`] | [`ChatModel`](chat::ChatModel) seam and [`Chatbot`](chat::Chatbot) orchestration |
//! | [`repl`] | Line-based interactive loop |
//! | [`config`] | Defaults, environment loading, client/chatbot construction |
//! | [`logging`] | `tracing-subscriber` setup for the binaries |

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod prompt;
pub mod repl;
pub mod session;

use serde::{Deserialize, Serialize};

pub use error::{ChatError, ConfigError};

// ── Constants ──────────────────────────────────────────────────────

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for all chat calls.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Greeting shown when a conversation starts. Display only; never sent to the model.
pub const GREETING: &str =
    "Bonjour ! Je suis votre assistant médical Tessan. Comment puis-je vous aider aujourd'hui ?";

/// Farewell printed when the user quits.
pub const FAREWELL: &str = "Au revoir et prenez soin de vous !";

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Role name on the Gemini wire (`"user"` or `"model"`).
    pub fn gemini_role(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

/// Token usage statistics.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

/// A successful model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

impl ModelReply {
    /// A reply with text only, no usage or finish metadata.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            finish_reason: None,
        }
    }
}
