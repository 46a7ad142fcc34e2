//! REST endpoint handlers.
//!
//! Handlers hold the session store lock only to read or append history,
//! never across the model call.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use serde::{Deserialize, Serialize};
use tessan_chat::ChatError;
use tessan_chat::chat::Chatbot;
use tessan_chat::session::{SessionStore, generate_session_id};
use tracing::{debug, warn};

use crate::snapshot::SessionSnapshot;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub chatbot: Arc<Chatbot>,
    pub store: Arc<Mutex<SessionStore>>,
}

impl AppState {
    fn store(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// GET / — The chat page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /api/sessions — Start a new conversation.
///
/// Returns 201 with the snapshot of the fresh session (greeting only).
pub async fn create_session(State(app): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let session_id = generate_session_id();
    let snapshot = {
        let mut store = app.store();
        let history = store.get_or_create(&session_id);
        SessionSnapshot::from_history(&session_id, history)
    };
    debug!("Started session {session_id}");
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/sessions/{id} — Transcript of an existing session.
///
/// Returns 404 for ids the server has never seen.
pub async fn get_session(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let store = app.store();
    store
        .get(&id)
        .map(|history| Json(SessionSnapshot::from_history(&id, history)))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Request body for POST /api/chat.
#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// Successful reply from POST /api/chat.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: String,
    pub reply: String,
}

/// Error body returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    /// Whether sending the same message again may succeed.
    pub retryable: bool,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, error: impl Into<String>, retryable: bool) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            retryable,
        }),
    )
}

fn chat_error_response(e: &ChatError) -> ApiError {
    let status = match e {
        ChatError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::Rejected(_) => StatusCode::BAD_GATEWAY,
        ChatError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string(), e.is_retryable())
}

/// POST /api/chat — Send a user message and wait for the full reply.
///
/// Unknown session ids get a history on first use. Only successful
/// exchanges are recorded.
pub async fn post_chat(
    State(app): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message is empty", false));
    }

    let history = app
        .store()
        .get_or_create(&body.session_id)
        .messages()
        .to_vec();

    let reply = app
        .chatbot
        .reply(&history, &body.message)
        .await
        .map_err(|e| {
            warn!("Chat turn failed for {}: {e}", body.session_id);
            chat_error_response(&e)
        })?;

    app.store()
        .get_or_create(&body.session_id)
        .record_exchange(body.message, reply.text.clone());

    Ok(Json(ChatReply {
        session_id: body.session_id,
        reply: reply.text,
    }))
}
