//! Browser-based chat UI for the Tessan medical assistant.
//!
//! `tessan-web` serves a single-page chat interface and a small REST API on
//! top of a shared [`Chatbot`] and [`SessionStore`]. Every browser
//! conversation has its own session id; "Nouvelle conversation" asks the
//! server for a fresh one.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use tessan_chat::session::SessionStore;
//! use tessan_web::{WebConfig, spawn_web};
//!
//! let chatbot = Arc::new(config.build_chatbot(api_key)?);
//! let store = Arc::new(Mutex::new(SessionStore::new()));
//! let addr = spawn_web(chatbot, store, WebConfig::default()).await?;
//! println!("Web UI: http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | Chat page |
//! | `POST /api/sessions` | Start a conversation, returns its snapshot |
//! | `GET /api/sessions/{id}` | Transcript of an existing conversation |
//! | `POST /api/chat` | Send `{session_id, message}`, returns `{reply}` |
//!
//! Each chat request makes one synchronous model call; the full reply is
//! returned at once.

mod api;
mod server;
pub mod snapshot;

pub use api::{ChatReply, ErrorBody};
pub use snapshot::{SessionSnapshot, TranscriptEntry};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tessan_chat::chat::Chatbot;
use tessan_chat::session::SessionStore;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8501`.
    pub bind_addr: SocketAddr,
    /// Directory of extra static assets served for unmatched paths.
    ///
    /// If `None`, only the embedded page and the API are served.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
///
/// # Arguments
///
/// * `chatbot` — Model, system instruction and retry policy shared by all sessions.
/// * `store` — Conversation histories, keyed by session id.
/// * `config` — Server configuration.
pub async fn spawn_web(
    chatbot: Arc<Chatbot>,
    store: Arc<Mutex<SessionStore>>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let router = server::build_router(chatbot, store, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
