// ---------------------------------------------------------------------------
// handlers/ — request handlers grouped by surface.
// mod.rs owns the error taxonomy shared by all of them.
// ---------------------------------------------------------------------------

pub(crate) mod chat;
pub(crate) mod extract;
pub(crate) mod system;
#[cfg(test)]
mod tests;

pub use chat::{chat_history, chat_message, clear_session, extract_website};
pub use extract::{extract_xpaths, extract_xpaths_fast};
pub use system::{health, root};

use std::time::Instant;

use axum::Json;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::fetcher::FetchError;
use crate::gemini::GeminiError;
use crate::sessions::SessionError;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Centralized API error type for all handlers.
/// Logs full details server-side, returns sanitized JSON to the client.
///
/// Response format (structured):
/// ```json
/// {
///   "error": {
///     "code": "INVALID_URL",
///     "message": "Human-readable description",
///     "request_id": "uuid",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Model call timed out after {0}s")]
    ModelTimeout(u64),

    #[error("Model provider error: {0}")]
    Model(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable error code string for each variant.
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidUrl(_) => "INVALID_URL",
            ApiError::Fetch(_) => "FETCH_FAILED",
            ApiError::ModelTimeout(_) => "MODEL_TIMEOUT",
            ApiError::Model(_) => "MODEL_ERROR",
            ApiError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code for each variant. Invalid and unreachable URLs are
    /// both the caller's input problem, hence 400 for `Fetch`.
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sanitized message safe to return to clients. Provider and internal
    /// errors get generic text — raw provider bodies stay in the server log,
    /// never in a response.
    fn sanitized_message(&self) -> String {
        match self {
            ApiError::BadRequest(m) => m.clone(),
            ApiError::InvalidUrl(m) => format!("Invalid URL: {m}"),
            ApiError::Fetch(m) => m.clone(),
            ApiError::ModelTimeout(secs) => {
                format!("Model did not answer within {secs}s, please retry")
            }
            ApiError::Model(_) => "Model provider error".to_string(),
            ApiError::SessionNotFound(id) => format!("Session not found: {id}"),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        // Correlation id for matching a client report to a log line.
        let request_id = Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            code = self.error_code(),
            "API error ({}): {}",
            status.as_u16(),
            self
        );

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.sanitized_message(),
                "request_id": request_id,
                "details": null,
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidUrl { url, reason } => {
                ApiError::InvalidUrl(format!("'{url}': {reason}"))
            }
            other => ApiError::Fetch(other.to_string()),
        }
    }
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Timeout(secs) => ApiError::ModelTimeout(secs),
            GeminiError::Api(msg) => ApiError::Model(msg),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => ApiError::SessionNotFound(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Wall-clock seconds since `started`, rounded to two decimals for response
/// bodies.
pub(crate) fn elapsed_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}
