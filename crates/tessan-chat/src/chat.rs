//! The model seam and the chat orchestration built on it.
//!
//! [`ChatModel`] is the one trait a provider implements. [`Chatbot`] pairs a
//! model with the rendered system instruction and a retry policy, and is the
//! only thing the CLI and web front ends talk to.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::api::RetryConfig;
use crate::session::ConversationHistory;
use crate::{ChatError, Message, ModelReply};

/// Boxed future returned by [`ChatModel::generate`].
pub type ReplyFuture<'a> = BoxFuture<'a, Result<ModelReply, ChatError>>;

/// A chat model that turns a system instruction plus turn list into a reply.
///
/// `messages` always ends with the user turn being answered.
///
/// # Example
///
/// ```
/// use tessan_chat::chat::{ChatModel, ReplyFuture};
/// use tessan_chat::{Message, ModelReply};
///
/// struct Echo;
///
/// impl ChatModel for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn generate<'a>(&'a self, _system: &'a str, messages: &'a [Message]) -> ReplyFuture<'a> {
///         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Box::pin(async move { Ok(ModelReply::text(last)) })
///     }
/// }
/// ```
pub trait ChatModel: Send + Sync {
    /// Model identifier, used in logs.
    fn name(&self) -> &str;

    fn generate<'a>(&'a self, system_instruction: &'a str, messages: &'a [Message])
    -> ReplyFuture<'a>;
}

/// A model bound to a system instruction and retry policy.
#[derive(Clone)]
pub struct Chatbot {
    model: Arc<dyn ChatModel>,
    system_instruction: String,
    retry: RetryConfig,
}

impl Chatbot {
    pub fn new(model: Arc<dyn ChatModel>, system_instruction: impl Into<String>) -> Self {
        Self {
            model,
            system_instruction: system_instruction.into(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Ask the model to answer `input` given the prior `history`.
    ///
    /// Transient failures are retried with backoff; everything else is
    /// returned at once. History is not modified.
    pub async fn reply(&self, history: &[Message], input: &str) -> Result<ModelReply, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.extend_from_slice(history);
        messages.push(Message::user(input));

        let mut attempt = 0;
        loop {
            match self
                .model
                .generate(&self.system_instruction, &messages)
                .await
            {
                Ok(reply) => {
                    debug!(
                        "Reply from {} after {} attempt(s): {} chars",
                        self.model.name(),
                        attempt + 1,
                        reply.text.len()
                    );
                    return Ok(reply);
                }
                Err(e) => {
                    let Some(delay) = self.retry.next_delay(&e, attempt) else {
                        return Err(e);
                    };
                    warn!(
                        "Transient error from {} (attempt {}/{}), retrying in {:.1}s: {e}",
                        self.model.name(),
                        attempt + 1,
                        self.retry.max_retries + 1,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// [`reply`](Self::reply), then record the exchange in `history` on success.
    pub async fn send(
        &self,
        history: &mut ConversationHistory,
        input: &str,
    ) -> Result<ModelReply, ChatError> {
        let reply = self.reply(history.messages(), input).await?;
        history.record_exchange(input, &reply.text);
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays queued results and records every request it receives.
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<ModelReply, ChatError>>>,
        pub requests: Mutex<Vec<(String, Vec<Message>)>>,
    }

    impl ScriptedModel {
        pub fn new(replies: Vec<Result<ModelReply, ChatError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl ChatModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate<'a>(&'a self, system: &'a str, messages: &'a [Message]) -> ReplyFuture<'a> {
            self.requests
                .lock()
                .unwrap()
                .push((system.to_string(), messages.to_vec()));
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::Rejected("script exhausted".into())));
            Box::pin(async move { next })
        }
    }
}
