// Application state

use std::sync::Arc;

use reqwest::Client;

use crate::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL, GeminiClient};
use crate::sessions::SessionStore;

/// Central application state. Clone-friendly — everything shared sits behind
/// an Arc, and `Client` is internally reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub gemini: Arc<GeminiClient>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Builds state from the environment:
    ///
    /// * `GOOGLE_API_KEY` (fallback `GEMINI_API_KEY`) — provider credential
    /// * `GEMINI_MODEL` — model name, default `gemini-2.0-flash`
    /// * `GEMINI_API_BASE` — provider base URL, overridable for tests
    pub fn new() -> Self {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .unwrap_or_default();
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let gemini = Arc::new(GeminiClient::new(client.clone(), api_base, api_key, model));
        if !gemini.has_credentials() {
            tracing::warn!(
                "No GOOGLE_API_KEY / GEMINI_API_KEY set — model-backed endpoints will fail"
            );
        }
        tracing::info!(
            "AppState initialised — model={}, key={}",
            gemini.model(),
            if gemini.has_credentials() { "present" } else { "missing" }
        );

        Self {
            gemini,
            client,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
