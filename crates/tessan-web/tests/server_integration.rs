//! Integration tests for the tessan-web server.
//!
//! These tests start a real axum server on a random port, backed by a
//! scripted model, and exercise the REST endpoints.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tessan_chat::chat::{ChatModel, Chatbot, ReplyFuture};
use tessan_chat::session::SessionStore;
use tessan_chat::{ChatError, GREETING, Message, ModelReply};
use tessan_web::{ChatReply, ErrorBody, SessionSnapshot, WebConfig, spawn_web};

/// Replays queued results and records the turn lists it was given.
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, ChatError>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(&'a self, _system: &'a str, messages: &'a [Message]) -> ReplyFuture<'a> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Rejected("script exhausted".into())));
        Box::pin(async move { next })
    }
}

struct TestServer {
    base: String,
    store: Arc<Mutex<SessionStore>>,
    model: Arc<ScriptedModel>,
    client: reqwest::Client,
}

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server(replies: Vec<Result<ModelReply, ChatError>>) -> TestServer {
    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(replies.into()),
        seen: Mutex::new(Vec::new()),
    });
    let chatbot = Arc::new(Chatbot::new(model.clone(), "[RÔLE]\nassistant"));
    let store = Arc::new(Mutex::new(SessionStore::new()));

    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        ..Default::default()
    };

    let addr = spawn_web(chatbot, store.clone(), config).await.unwrap();
    TestServer {
        base: format!("http://{addr}"),
        store,
        model,
        client: reqwest::Client::new(),
    }
}

impl TestServer {
    async fn new_session(&self) -> SessionSnapshot {
        let resp = self
            .client
            .post(format!("{}/api/sessions", self.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        resp.json().await.unwrap()
    }

    async fn chat(&self, session_id: &str, message: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/chat", self.base))
            .json(&serde_json::json!({"session_id": session_id, "message": message}))
            .send()
            .await
            .unwrap()
    }
}

// ── Page ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_chat_page() {
    let server = spawn_test_server(vec![]).await;

    let resp = reqwest::get(format!("{}/", server.base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Nouvelle conversation"));
    assert!(html.contains("Assistant Médical Tessan"));
}

// ── Sessions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn new_session_starts_with_greeting() {
    let server = spawn_test_server(vec![]).await;

    let snapshot = server.new_session().await;
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].content, GREETING);
    assert!(server.store.lock().unwrap().contains(&snapshot.session_id));
}

#[tokio::test]
async fn each_new_session_gets_a_fresh_id() {
    let server = spawn_test_server(vec![]).await;

    let a = server.new_session().await;
    let b = server.new_session().await;
    assert_ne!(a.session_id, b.session_id);
    assert_eq!(server.store.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_session_returns_404() {
    let server = spawn_test_server(vec![]).await;

    let resp = reqwest::get(format!("{}/api/sessions/nope", server.base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// ── Chat ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_returns_reply_and_records_history() {
    let server = spawn_test_server(vec![
        Ok(ModelReply::text("Reposez-vous.")),
        Ok(ModelReply::text("Consultez un médecin.")),
    ])
    .await;
    let session = server.new_session().await;

    let resp = server.chat(&session.session_id, "J'ai de la fièvre").await;
    assert_eq!(resp.status(), 200);
    let reply: ChatReply = resp.json().await.unwrap();
    assert_eq!(reply.reply, "Reposez-vous.");
    assert_eq!(reply.session_id, session.session_id);

    let resp = server.chat(&session.session_id, "Et si ça dure ?").await;
    assert_eq!(resp.status(), 200);

    // Second call carried the first exchange.
    let seen = server.model.seen.lock().unwrap().clone();
    assert_eq!(seen[1].len(), 3);
    assert_eq!(seen[1][1], Message::assistant("Reposez-vous."));

    let snapshot: SessionSnapshot =
        reqwest::get(format!("{}/api/sessions/{}", server.base, session.session_id))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(snapshot.messages.len(), 5);
    assert_eq!(snapshot.messages[4].content, "Consultez un médecin.");
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let server = spawn_test_server(vec![
        Ok(ModelReply::text("pour a")),
        Ok(ModelReply::text("pour b")),
    ])
    .await;
    let a = server.new_session().await;
    let b = server.new_session().await;

    assert_eq!(server.chat(&a.session_id, "question a").await.status(), 200);
    assert_eq!(server.chat(&b.session_id, "question b").await.status(), 200);

    let seen = server.model.seen.lock().unwrap().clone();
    assert_eq!(seen[1], vec![Message::user("question b")]);

    let store = server.store.lock().unwrap();
    assert_eq!(store.get(&a.session_id).unwrap().len(), 2);
    assert_eq!(store.get(&b.session_id).unwrap().len(), 2);
}

#[tokio::test]
async fn blank_message_is_rejected_without_model_call() {
    let server = spawn_test_server(vec![]).await;
    let session = server.new_session().await;

    let resp = server.chat(&session.session_id, "   ").await;
    assert_eq!(resp.status(), 400);
    assert!(server.model.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn model_errors_map_to_status_and_leave_history_alone() {
    let server = spawn_test_server(vec![
        Err(ChatError::Transient("HTTP 503: overloaded".into())),
        Err(ChatError::Rejected("prompt blocked: SAFETY".into())),
    ])
    .await;
    let session = server.new_session().await;

    let resp = server.chat(&session.session_id, "un").await;
    assert_eq!(resp.status(), 503);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.retryable);
    assert!(body.error.contains("overloaded"));

    let resp = server.chat(&session.session_id, "deux").await;
    assert_eq!(resp.status(), 502);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(!body.retryable);

    assert!(
        server
            .store
            .lock()
            .unwrap()
            .get(&session.session_id)
            .unwrap()
            .is_empty()
    );
}
