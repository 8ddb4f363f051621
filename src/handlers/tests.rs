// ---------------------------------------------------------------------------
// handlers/tests.rs — Unit tests for the error taxonomy and shared helpers
// ---------------------------------------------------------------------------

use super::*;
use axum::http::StatusCode;

use crate::fetcher::FetchError;
use crate::gemini::GeminiError;
use crate::models::{ChatRequest, UrlRequest};
use crate::sessions::SessionError;

#[test]
fn test_error_codes_and_statuses() {
    let cases: Vec<(ApiError, StatusCode, &str)> = vec![
        (
            ApiError::BadRequest("x".into()),
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
        ),
        (
            ApiError::InvalidUrl("x".into()),
            StatusCode::BAD_REQUEST,
            "INVALID_URL",
        ),
        (
            ApiError::Fetch("x".into()),
            StatusCode::BAD_REQUEST,
            "FETCH_FAILED",
        ),
        (
            ApiError::ModelTimeout(25),
            StatusCode::REQUEST_TIMEOUT,
            "MODEL_TIMEOUT",
        ),
        (
            ApiError::Model("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "MODEL_ERROR",
        ),
        (
            ApiError::SessionNotFound("x".into()),
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
        ),
        (
            ApiError::Internal("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
        ),
    ];
    for (err, status, code) in cases {
        assert_eq!(err.status_code(), status, "{code}");
        assert_eq!(err.error_code(), code);
    }
}

#[test]
fn test_provider_errors_are_sanitized() {
    // Whatever the provider said (quota ids, key fragments) must not reach
    // the client.
    let err = ApiError::Model("HTTP 403: key AIza-whatever was rejected".into());
    assert_eq!(err.sanitized_message(), "Model provider error");

    let err = ApiError::Internal("worker panicked at src/gemini.rs:42".into());
    assert_eq!(err.sanitized_message(), "Internal server error");
}

#[test]
fn test_client_side_errors_keep_their_message() {
    let err = ApiError::InvalidUrl("'example.com': relative URL without a base".into());
    assert!(err.sanitized_message().contains("example.com"));

    let err = ApiError::SessionNotFound("abc123".into());
    assert!(err.sanitized_message().contains("abc123"));

    let err = ApiError::ModelTimeout(25);
    assert!(err.sanitized_message().contains("25s"));
}

#[test]
fn test_fetch_error_mapping() {
    let invalid = FetchError::InvalidUrl {
        url: "nope".into(),
        reason: "relative URL without a base".into(),
    };
    assert!(matches!(ApiError::from(invalid), ApiError::InvalidUrl(_)));

    let http = FetchError::Http {
        url: "https://example.com".into(),
        status: 503,
    };
    let mapped = ApiError::from(http);
    assert!(matches!(mapped, ApiError::Fetch(_)));
    assert!(mapped.sanitized_message().contains("503"));
}

#[test]
fn test_gemini_and_session_error_mapping() {
    assert!(matches!(
        ApiError::from(GeminiError::Timeout(30)),
        ApiError::ModelTimeout(30)
    ));
    assert!(matches!(
        ApiError::from(GeminiError::Api("boom".into())),
        ApiError::Model(_)
    ));
    assert!(matches!(
        ApiError::from(SessionError::NotFound("s1".into())),
        ApiError::SessionNotFound(_)
    ));
}

#[test]
fn test_elapsed_seconds_rounds_to_two_decimals() {
    let started = Instant::now();
    let elapsed = elapsed_seconds(started);
    assert!(elapsed >= 0.0);
    // Two decimals means scaling by 100 yields an integer.
    assert!((elapsed * 100.0).fract().abs() < 1e-9);
}

#[test]
fn test_request_dtos_deserialize() {
    let url_req: UrlRequest = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
    assert_eq!(url_req.url, "https://example.com");

    let chat_req: ChatRequest =
        serde_json::from_str(r#"{"session_id": "abc", "message": "hi"}"#).unwrap();
    assert_eq!(chat_req.session_id, "abc");

    // Both fields are required.
    assert!(serde_json::from_str::<ChatRequest>(r#"{"message": "hi"}"#).is_err());
    assert!(serde_json::from_str::<UrlRequest>(r#"{}"#).is_err());
}
