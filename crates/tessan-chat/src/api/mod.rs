//! API interaction layer: the Gemini HTTP client and retry policy.
//!
//! - [`gemini`] — request/response wire types and [`GeminiClient`], the
//!   production [`ChatModel`](crate::chat::ChatModel).
//! - [`retry`] — exponential backoff with jitter for
//!   [`ChatError::Transient`](crate::ChatError::Transient) failures.

pub mod gemini;
pub mod retry;

pub use gemini::{GeminiClient, GeminiOptions};
pub use retry::RetryConfig;
