pub mod fetcher;
pub mod gemini;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod reduce;
pub mod sessions;
pub mod state;
pub mod xpath;

use axum::Router;
use axum::routing::{delete, get, post};

use state::AppState;

/// Build the application router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    // Reclaims idle chat sessions in the background for the life of the
    // process.
    let _sweeper = sessions::spawn_sweeper(state.sessions.clone());

    Router::new()
        // Banner + health
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        // XPath extraction
        .route("/api/extract-xpaths", post(handlers::extract_xpaths))
        .route("/api/extract-xpaths/fast", post(handlers::extract_xpaths_fast))
        // Website chat
        .route("/api/extract-website", post(handlers::extract_website))
        .route("/api/chat", post(handlers::chat_message))
        .route("/api/chat/{session_id}/history", get(handlers::chat_history))
        .route("/api/chat/{session_id}", delete(handlers::clear_session))
        // Shared state
        .with_state(state)
}
