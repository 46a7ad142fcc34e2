//! In-memory conversation histories keyed by session id.
//!
//! A [`SessionStore`] is an ordinary value: the CLI owns one, the web server
//! shares one behind `Arc<Mutex<_>>`. Histories live as long as the store and
//! are never evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use serde::Serialize;
use tracing::debug;

use crate::Message;

/// Generate a session id unique within this process.
pub fn generate_session_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // Counter covers ids minted within the same clock tick.
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("session-{ts:x}-{count:04x}")
}

// ── ConversationHistory ────────────────────────────────────────────

/// Append-only list of exchanged messages, in exchange order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a user message followed by the assistant's reply.
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push(Message::user(user));
        self.messages.push(Message::assistant(assistant));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ── SessionStore ───────────────────────────────────────────────────

/// Map from session id to [`ConversationHistory`]. Entries are created
/// lazily and never removed.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, ConversationHistory>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for `session_id`, created empty on first access.
    pub fn get_or_create(&mut self, session_id: &str) -> &mut ConversationHistory {
        if !self.sessions.contains_key(session_id) {
            debug!("Creating history for session {session_id}");
        }
        self.sessions.entry(session_id.to_string()).or_default()
    }

    pub fn get(&self, session_id: &str) -> Option<&ConversationHistory> {
        self.sessions.get(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_returns_same_history() {
        let mut store = SessionStore::new();
        let first: *const ConversationHistory = store.get_or_create("a");
        store.get_or_create("a").record_exchange("q", "r");
        let second: *const ConversationHistory = store.get_or_create("a");

        assert_eq!(first, second);
        assert_eq!(store.get("a").unwrap().len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_ids_are_independent() {
        let mut store = SessionStore::new();
        store.get_or_create("a").record_exchange("qa", "ra");
        store.get_or_create("b");

        assert_eq!(store.len(), 2);
        assert!(store.get("b").unwrap().is_empty());
        assert_eq!(
            store.get("a").unwrap().messages(),
            &[Message::user("qa"), Message::assistant("ra")]
        );
    }

    #[test]
    fn get_does_not_create() {
        let store = SessionStore::new();
        assert!(store.get("missing").is_none());
        assert!(!store.contains("missing"));
        assert!(store.is_empty());
    }

    #[test]
    fn history_preserves_exchange_order() {
        let mut history = ConversationHistory::new();
        history.record_exchange("1", "2");
        history.push(Message::user("3"));
        let contents: Vec<&str> = history.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["1", "2", "3"]);
    }

    #[test]
    fn session_ids_are_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.starts_with("session-"));
    }
}
