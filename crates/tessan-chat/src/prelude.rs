//! Convenience re-exports for common `tessan-chat` types.
//!
//! ```ignore
//! use tessan_chat::prelude::*;
//! ```

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ChatError, ConfigError, Message, MessageRole, ModelReply};

// ── Model access ────────────────────────────────────────────────────
pub use crate::api::{GeminiClient, GeminiOptions, RetryConfig};
pub use crate::chat::{ChatModel, Chatbot, ReplyFuture};

// ── Prompts ─────────────────────────────────────────────────────────
pub use crate::prompt::{FewShotExample, PromptMode, PromptSource, PromptTemplate};

// ── Sessions and front ends ─────────────────────────────────────────
pub use crate::config::{ChatConfig, api_key_from_env, load_dotenv};
pub use crate::repl::{InputAction, Repl, ReplExit};
pub use crate::session::{ConversationHistory, SessionStore, generate_session_id};
