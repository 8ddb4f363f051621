// ---------------------------------------------------------------------------
// handlers/system.rs — service banner and health
// ---------------------------------------------------------------------------

use axum::Json;
use serde_json::{Value, json};

use crate::models::HealthResponse;

pub const SERVICE_NAME: &str = "pagelens";

/// GET / — human-visible banner, handy for checking the service is up from
/// a browser.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "PageLens API is running" }))
}

/// GET /api/health — liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
