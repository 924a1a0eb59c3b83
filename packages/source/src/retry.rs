//! HTTP retry helper for transient errors.
//!
//! Fetchers call [`send_text`] instead of `reqwest::RequestBuilder::send()`
//! directly so every request gets automatic retry with exponential backoff
//! for transient failures (timeouts, connection resets, server errors,
//! rate limiting).

use std::time::Duration;

use crate::IngestionError;

/// Maximum number of retry attempts for transient HTTP errors. With
/// exponential backoff (2s, 4s, 8s) the total wait before giving up is
/// 14 seconds.
const MAX_RETRIES: u32 = 3;

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`. Retries connection errors, timeouts, HTTP 429 and HTTP 5xx;
/// other 4xx statuses are permanent and returned immediately.
///
/// # Errors
///
/// Returns [`IngestionError::Fetch`] if the request fails after all
/// retries, or [`IngestionError::Status`] for a non-retryable status code.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F) -> Result<String, IngestionError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<IngestionError> = None;

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s
            log::warn!("  retry {attempt}/{MAX_RETRIES} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < MAX_RETRIES {
                    log::warn!("  transient error: {e}");
                    last_error = Some(IngestionError::Fetch(e));
                    continue;
                }
                return Err(IngestionError::Fetch(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < MAX_RETRIES {
                        log::warn!("  HTTP {status}, retrying");
                        last_error = Some(IngestionError::Status { status });
                        continue;
                    }
                    return Err(IngestionError::Status { status });
                }

                if status.is_client_error() {
                    return Err(IngestionError::Status { status });
                }

                return response.text().await.map_err(IngestionError::Fetch);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| IngestionError::StructuralParse {
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
