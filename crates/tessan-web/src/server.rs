//! Router assembly and the background serve task.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};
use tessan_chat::chat::Chatbot;
use tessan_chat::session::SessionStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::api::{self, AppState};

/// Routes for the chat page and the session API, sharing one [`AppState`].
///
/// Paths outside `/` and `/api/*` fall through to `static_dir` when given,
/// and 404 otherwise.
pub fn build_router(
    chatbot: Arc<Chatbot>,
    store: Arc<Mutex<SessionStore>>,
    static_dir: Option<PathBuf>,
) -> Router {
    let sessions: Router<AppState> = Router::new()
        .route("/api/sessions", post(api::create_session))
        .route("/api/sessions/{id}", get(api::get_session))
        .route("/api/chat", post(api::post_chat));

    let router = Router::new()
        .route("/", get(api::index))
        .merge(sessions)
        .with_state(AppState { chatbot, store })
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Bind `bind_addr`, start serving on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("Listening on http://{addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Web server stopped: {e}");
        }
    });

    Ok(addr)
}
