//! Page retrieval for the extraction pipeline.
//!
//! Validation is deliberately shallow: any absolute URL with a host is
//! accepted, and everything else (DNS, TLS, redirects) is left to the HTTP
//! client. Callers get the final URL back so redirect targets are reported
//! honestly.

use std::time::Duration;

use reqwest::Client;
use url::Url;

/// Hard cap on a single page fetch. Slow origins fail fast instead of
/// stalling the whole request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Refuse to buffer documents larger than this (5 MiB).
const MAX_PAGE_SIZE: usize = 5 * 1024 * 1024;

/// Some origins serve stripped-down or blocked pages to generic clients, so
/// we identify as a desktop browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final URL after redirects.
    pub url: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("'{url}' answered HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("fetching '{url}' failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{url}' is too large ({size} bytes)")]
    TooLarge { url: String, size: usize },
}

/// Checks that `raw` is an absolute URL with a non-empty host. No scheme
/// allowlist: anything `Url` can parse with a host is considered well-formed.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        }),
    }
}

/// Downloads a page as text. Non-2xx statuses and oversized bodies are
/// errors; the body is decoded lossily so odd encodings never abort a fetch.
pub async fn fetch_page(client: &Client, raw_url: &str) -> Result<FetchResult, FetchError> {
    let parsed = validate_url(raw_url)?;

    let response = client
        .get(parsed)
        .header("User-Agent", BROWSER_USER_AGENT)
        .header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| FetchError::Network {
            url: raw_url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            url: raw_url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(length) = response.content_length()
        && length as usize > MAX_PAGE_SIZE
    {
        return Err(FetchError::TooLarge {
            url: raw_url.to_string(),
            size: length as usize,
        });
    }

    let final_url = response.url().to_string();
    let bytes = response.bytes().await.map_err(|e| FetchError::Network {
        url: raw_url.to_string(),
        source: e,
    })?;
    if bytes.len() > MAX_PAGE_SIZE {
        return Err(FetchError::TooLarge {
            url: raw_url.to_string(),
            size: bytes.len(),
        });
    }

    Ok(FetchResult {
        url: final_url,
        html: String::from_utf8_lossy(&bytes).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_http_urls() {
        assert!(validate_url("https://example.com/docs?page=2").is_ok());
        assert!(validate_url("http://localhost:8080/").is_ok());
    }

    #[test]
    fn accepts_unusual_schemes_with_a_host() {
        // Scheme filtering is not this layer's job.
        assert!(validate_url("ftp://files.example.com/readme.txt").is_ok());
    }

    #[test]
    fn rejects_relative_urls() {
        assert!(matches!(
            validate_url("example.com/page"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            validate_url(""),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_urls_without_a_host() {
        assert!(matches!(
            validate_url("mailto:someone@example.com"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("file:///etc/hosts"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn fetch_reports_http_error_statuses() {
        let app = axum::Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::new();
        let err = fetch_page(&client, &format!("http://{addr}/missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn fetch_returns_body_and_final_url() {
        use axum::response::Html;
        use axum::routing::get;

        let app = axum::Router::new().route("/", get(|| async { Html("<p>hi</p>") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::new();
        let page = fetch_page(&client, &format!("http://{addr}/")).await.unwrap();
        assert!(page.html.contains("<p>hi</p>"));
        assert!(page.url.contains(&addr.to_string()));
    }
}
