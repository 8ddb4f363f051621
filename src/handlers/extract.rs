// ---------------------------------------------------------------------------
// XPath extraction endpoints
// ---------------------------------------------------------------------------

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use super::{ApiError, elapsed_seconds};
use crate::models::{UrlRequest, XPathResponse};
use crate::state::AppState;
use crate::{fetcher, gemini, prompt, reduce, xpath};

/// Cleaned-markup allowance echoed back for debugging.
const HTML_PREVIEW_LIMIT: usize = 5_000;

/// POST /api/extract-xpaths — fetch a page, clean it, have the model
/// propose locators for its elements.
pub async fn extract_xpaths(
    State(state): State<AppState>,
    Json(body): Json<UrlRequest>,
) -> Result<Json<XPathResponse>, ApiError> {
    let started = Instant::now();
    let url = body.url.trim();
    if url.is_empty() {
        return Err(ApiError::InvalidUrl("url must not be empty".to_string()));
    }

    let page = fetcher::fetch_page(&state.client, url).await?;
    let cleaned = reduce::clean_document(&page.html);

    let generation_prompt = prompt::xpath_prompt(&page.url, &cleaned);
    let reply = state
        .gemini
        .generate(&generation_prompt, gemini::XPATH_GENERATION_TIMEOUT)
        .await?;
    let xpaths = xpath::parse_model_xpaths(&reply);

    tracing::info!(
        "extract_xpaths: {} locator(s) for {} in {:.2}s",
        xpaths.len(),
        page.url,
        started.elapsed().as_secs_f64()
    );

    Ok(Json(XPathResponse {
        url: page.url,
        xpaths,
        html_preview: prompt::truncate_with_marker(&cleaned, HTML_PREVIEW_LIMIT),
        status: "success".to_string(),
        processing_time_seconds: elapsed_seconds(started),
    }))
}

/// POST /api/extract-xpaths/fast — model-free variant: locators come from a
/// heuristic scan of the raw page. Empty scans fall back to the same
/// catch-all locators the model path uses.
pub async fn extract_xpaths_fast(
    State(state): State<AppState>,
    Json(body): Json<UrlRequest>,
) -> Result<Json<XPathResponse>, ApiError> {
    let started = Instant::now();
    let url = body.url.trim();
    if url.is_empty() {
        return Err(ApiError::InvalidUrl("url must not be empty".to_string()));
    }

    let page = fetcher::fetch_page(&state.client, url).await?;
    let mut xpaths = xpath::heuristic_xpaths(&page.html);
    if xpaths.is_empty() {
        xpaths = xpath::FALLBACK_XPATHS.iter().map(|s| s.to_string()).collect();
    }
    let cleaned = reduce::clean_document(&page.html);

    tracing::info!(
        "extract_xpaths_fast: {} locator(s) for {}",
        xpaths.len(),
        page.url
    );

    Ok(Json(XPathResponse {
        url: page.url,
        xpaths,
        html_preview: prompt::truncate_with_marker(&cleaned, HTML_PREVIEW_LIMIT),
        status: "success".to_string(),
        processing_time_seconds: elapsed_seconds(started),
    }))
}
