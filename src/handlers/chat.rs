// ---------------------------------------------------------------------------
// Website chat endpoints: extract a page into a session, then answer
// questions grounded in its content.
// ---------------------------------------------------------------------------

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use super::{ApiError, elapsed_seconds};
use crate::models::{
    ChatHistoryResponse, ChatRequest, ChatResponse, ClearSessionResponse,
    ExtractWebsiteResponse, UrlRequest, WebsiteInfo,
};
use crate::sessions::{self, ChatExchange};
use crate::state::AppState;
use crate::{fetcher, gemini, prompt, reduce};

/// Extracted-text allowance echoed back after extraction.
const CONTENT_PREVIEW_LIMIT: usize = 500;

/// Hard cap on a single chat message.
const MAX_MESSAGE_LENGTH: usize = 50_000;

/// POST /api/extract-website — fetch a page, reduce it to text and open a
/// chat session over it.
pub async fn extract_website(
    State(state): State<AppState>,
    Json(body): Json<UrlRequest>,
) -> Result<Json<ExtractWebsiteResponse>, ApiError> {
    let started = Instant::now();
    let url = body.url.trim();
    if url.is_empty() {
        return Err(ApiError::InvalidUrl("url must not be empty".to_string()));
    }

    let page = fetcher::fetch_page(&state.client, url).await?;
    let extracted = reduce::extract_text(&page.html);
    let session = state
        .sessions
        .create(&page.url, &extracted.title, &extracted.text, extracted.word_count)
        .await;

    tracing::info!(
        "extract_website: session {} for {} ({} words)",
        session.id,
        session.url,
        session.word_count
    );

    Ok(Json(ExtractWebsiteResponse {
        session_id: session.id,
        url: session.url,
        title: session.title,
        content_preview: preview(&extracted.text),
        word_count: extracted.word_count,
        status: "success".to_string(),
        processing_time_seconds: elapsed_seconds(started),
    }))
}

/// POST /api/chat — answer one question against a session's page content.
/// The exchange lands in the transcript only after the model answers, so a
/// failed generation leaves the history untouched.
pub async fn chat_message(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }
    if message.len() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "message exceeds {MAX_MESSAGE_LENGTH} characters"
        )));
    }

    let snapshot = state
        .sessions
        .get(&body.session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(body.session_id.clone()))?;

    let grounded_prompt = prompt::chat_prompt(
        &snapshot.session.title,
        &snapshot.session.content,
        &snapshot.exchanges,
        message,
    );
    let answer = state
        .gemini
        .generate(&grounded_prompt, gemini::CHAT_GENERATION_TIMEOUT)
        .await?;

    let exchange = ChatExchange {
        user_message: message.to_string(),
        ai_response: answer,
        timestamp: sessions::unix_now(),
    };
    state
        .sessions
        .append_exchange(&body.session_id, exchange.clone())
        .await?;

    tracing::info!(
        "chat: session {} answered ({} chars)",
        body.session_id,
        exchange.ai_response.len()
    );

    Ok(Json(ChatResponse {
        session_id: body.session_id,
        user_message: exchange.user_message,
        ai_response: exchange.ai_response,
        timestamp: exchange.timestamp,
    }))
}

/// GET /api/chat/{session_id}/history — full transcript plus the page the
/// session was opened on.
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let snapshot = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;

    Ok(Json(ChatHistoryResponse {
        session_id,
        history: snapshot.exchanges,
        website_info: WebsiteInfo {
            url: snapshot.session.url,
            title: snapshot.session.title,
            word_count: snapshot.session.word_count,
            extracted_at: snapshot.session.created_at.to_rfc3339(),
        },
    }))
}

/// DELETE /api/chat/{session_id} — drop a session. Idempotent: clearing an
/// id that never existed (or was already swept) still succeeds.
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ClearSessionResponse> {
    let removed = state.sessions.remove(&session_id).await;
    tracing::info!(
        "clear_session: {} ({})",
        session_id,
        if removed { "removed" } else { "already absent" }
    );
    Json(ClearSessionResponse {
        status: "cleared".to_string(),
        session_id,
    })
}

/// Leading whole characters within [`CONTENT_PREVIEW_LIMIT`] bytes, no
/// marker.
fn preview(text: &str) -> String {
    text.char_indices()
        .take_while(|(i, _)| *i < CONTENT_PREVIEW_LIMIT)
        .map(|(_, c)| c)
        .collect()
}
