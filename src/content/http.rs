//! HTTP utilities for content providers
//!
//! Provides common request/response handling so the individual providers
//! stay thin: one shared client, one fetch path, one error taxonomy.

use crate::config::get_content_http_timeout_secs;
use crate::content::ContentError;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

/// Creates an HTTP client configured with the standard content timeout.
///
/// Uses `CONTENT_HTTP_TIMEOUT_SECS` environment variable or 10s default.
/// This prevents infinite hangs when an API is slow or unresponsive.
#[must_use]
pub fn create_http_client() -> HttpClient {
    let timeout = Duration::from_secs(get_content_http_timeout_secs());
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Sends an HTTP GET request and returns the parsed JSON response.
///
/// # Errors
///
/// Returns `ContentError::Network` on connectivity issues,
/// `ContentError::Api` on non-success status codes, or
/// `ContentError::Json` if parsing fails.
pub async fn fetch_json(client: &HttpClient, url: &str) -> Result<Value, ContentError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ContentError::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        // Truncate very long error bodies
        let truncated = if error_text.len() > 500 {
            format!("{}... (truncated)", &error_text[..500])
        } else {
            error_text
        };

        return Err(ContentError::Api(format!("{status} - {truncated}")));
    }

    response
        .json()
        .await
        .map_err(|e| ContentError::Json(e.to_string()))
}

/// Fetches JSON with a short exponential-backoff retry.
///
/// Retry policy lives here, inside the content layer only: two extra
/// attempts with jittered backoff (50ms, then 2.5s).
///
/// # Errors
///
/// Returns the last `ContentError` once the attempts are exhausted.
pub async fn fetch_json_with_retry(
    client: &HttpClient,
    url: &str,
) -> Result<Value, ContentError> {
    let strategy = ExponentialBackoff::from_millis(50).map(jitter).take(2);
    Retry::spawn(strategy, || fetch_json(client, url)).await
}
