//! Gemini invoker: bounded, time-budgeted `generateContent` calls.
//!
//! Every generation runs on its own task behind a semaphore, so a burst of
//! requests queues instead of flooding the provider, and a blown budget
//! aborts the in-flight call rather than letting it run to completion
//! unobserved.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

/// Budget for locator generation. Big pages make slow calls; anything past
/// this is not worth waiting on.
pub const XPATH_GENERATION_TIMEOUT: Duration = Duration::from_secs(25);

/// Budget for chat answers.
pub const CHAT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Generations allowed in flight at once. Callers past this block until a
/// permit frees up.
const MAX_CONCURRENT_GENERATIONS: usize = 4;

/// Transport-level ceiling per HTTP call, a backstop behind the caller's
/// budget.
const REQUEST_HARD_TIMEOUT: Duration = Duration::from_secs(120);

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("model call timed out after {0}s")]
    Timeout(u64),
    #[error("model provider error: {0}")]
    Api(String),
}

pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
    permits: Arc<Semaphore>,
}

impl GeminiClient {
    pub fn new(http: Client, api_base: String, api_key: String, model: String) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            permits: Arc::new(Semaphore::new(MAX_CONCURRENT_GENERATIONS)),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Sends `prompt` and returns the reply text, waiting at most `budget`.
    ///
    /// The permit is taken before the worker task is spawned, so a caller
    /// queued on the pool has not started its budget clock yet. On timeout
    /// the worker is aborted, which drops the HTTP future and releases the
    /// permit.
    pub async fn generate(&self, prompt: &str, budget: Duration) -> Result<String, GeminiError> {
        if self.api_key.is_empty() {
            return Err(GeminiError::Api(
                "no API key configured (set GOOGLE_API_KEY)".to_string(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 8192
            }
        });

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GeminiError::Api("generation pool is closed".to_string()))?;

        let http = self.http.clone();
        let api_key = self.api_key.clone();
        let mut worker = tokio::spawn(async move {
            let _permit = permit;
            dispatch(http, url, api_key, body).await
        });

        match tokio::time::timeout(budget, &mut worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(GeminiError::Api(format!(
                "generation worker failed: {join_err}"
            ))),
            Err(_) => {
                worker.abort();
                tracing::warn!(
                    "gemini: generation aborted after {}s budget",
                    budget.as_secs()
                );
                Err(GeminiError::Timeout(budget.as_secs()))
            }
        }
    }
}

async fn dispatch(
    http: Client,
    url: String,
    api_key: String,
    body: Value,
) -> Result<String, GeminiError> {
    let result = http
        .post(&url)
        .header("x-goog-api-key", &api_key)
        .json(&body)
        .timeout(REQUEST_HARD_TIMEOUT)
        .send()
        .await;

    let response = match result {
        Ok(resp) if resp.status().is_success() => resp,
        Ok(resp) => {
            let status = resp.status();
            let err_body = resp.text().await.unwrap_or_default();
            let safe_len = err_body
                .char_indices()
                .take_while(|(i, _)| *i < 500)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            return Err(GeminiError::Api(format!(
                "HTTP {status}: {}",
                &err_body[..safe_len]
            )));
        }
        Err(e) => return Err(GeminiError::Api(format!("request failed: {e}"))),
    };

    let reply: Value = response
        .json()
        .await
        .map_err(|e| GeminiError::Api(format!("unreadable response body: {e}")))?;

    response_text(&reply)
        .ok_or_else(|| GeminiError::Api(format!("response has no text ({})", diagnose(&reply))))
}

/// Pulls the reply text out of a `generateContent` response.
fn response_text(reply: &Value) -> Option<String> {
    reply
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c0| c0.get("content"))
        .and_then(|ct| ct.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p0| p0.get("text"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
}

/// Explains why a structurally valid response carried no text: block
/// reasons, elevated safety ratings, finish reasons, missing fields.
fn diagnose(reply: &Value) -> String {
    let mut diag = Vec::new();

    if let Some(feedback) = reply.get("promptFeedback") {
        if let Some(reason) = feedback.get("blockReason").and_then(|v| v.as_str()) {
            diag.push(format!("promptFeedback.blockReason={reason}"));
        }
        if let Some(ratings) = feedback.get("safetyRatings").and_then(|v| v.as_array()) {
            for rating in ratings {
                if let (Some(cat), Some(prob)) = (
                    rating.get("category").and_then(|v| v.as_str()),
                    rating.get("probability").and_then(|v| v.as_str()),
                ) && prob != "NEGLIGIBLE"
                    && prob != "LOW"
                {
                    diag.push(format!("safety: {cat}={prob}"));
                }
            }
        }
    }

    if let Some(candidates) = reply.get("candidates").and_then(|v| v.as_array()) {
        if candidates.is_empty() {
            diag.push("candidates array is empty".to_string());
        } else if let Some(c0) = candidates.first() {
            if let Some(reason) = c0.get("finishReason").and_then(|v| v.as_str()) {
                diag.push(format!("finishReason={reason}"));
            }
            if c0.get("content").is_none() {
                diag.push("candidate has no 'content' field".to_string());
            }
        }
    } else {
        diag.push("no 'candidates' field in response".to_string());
    }

    if diag.is_empty() {
        "unknown (response structure unrecognized)".to_string()
    } else {
        diag.join(", ")
    }
}
