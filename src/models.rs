use serde::{Deserialize, Serialize};

use crate::sessions::ChatExchange;

// ---------------------------------------------------------------------------
// XPath extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XPathResponse {
    pub url: String,
    pub xpaths: Vec<String>,
    pub html_preview: String,
    pub status: String,
    pub processing_time_seconds: f64,
}

// ---------------------------------------------------------------------------
// Website chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractWebsiteResponse {
    pub session_id: String,
    pub url: String,
    pub title: String,
    pub content_preview: String,
    pub word_count: usize,
    pub status: String,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteInfo {
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub extracted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub history: Vec<ChatExchange>,
    pub website_info: WebsiteInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearSessionResponse {
    pub status: String,
    pub session_id: String,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
