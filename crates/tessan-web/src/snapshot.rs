//! Serializable view of a conversation for the browser.

use serde::{Deserialize, Serialize};
use tessan_chat::session::ConversationHistory;
use tessan_chat::{GREETING, MessageRole};

/// One rendered chat bubble.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: MessageRole,
    pub content: String,
}

/// A session's transcript as the page displays it.
///
/// The greeting always comes first. It is part of the display only and is
/// never sent to the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub messages: Vec<TranscriptEntry>,
}

impl SessionSnapshot {
    pub fn from_history(session_id: impl Into<String>, history: &ConversationHistory) -> Self {
        let greeting = TranscriptEntry {
            role: MessageRole::Assistant,
            content: GREETING.to_string(),
        };
        let messages = std::iter::once(greeting)
            .chain(history.messages().iter().map(|m| TranscriptEntry {
                role: m.role,
                content: m.content.clone(),
            }))
            .collect();
        Self {
            session_id: session_id.into(),
            messages,
        }
    }
}
