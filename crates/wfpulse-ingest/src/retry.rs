//! Retry with exponential backoff for transient upstream failures.

use std::future::Future;
use std::time::Duration;

use crate::error::IngestError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable: network-level failures (timeout, connection reset) and HTTP
/// 5xx / 429 responses. Deserialization failures and client-side statuses
/// are propagated immediately — retrying would return the same result.
fn is_retriable(err: &IngestError) -> bool {
    match err {
        IngestError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        IngestError::UnexpectedStatus { status, .. } => {
            status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
        }
        IngestError::Deserialize { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps `backoff_base_ms * 2^attempt`
/// milliseconds (capped at 60 s) and tries again, up to `max_retries`
/// additional attempts. Non-retriable errors return immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IngestError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay_ms = backoff_base_ms
                    .saturating_mul(1u64 << attempt.min(10))
                    .min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient ingest error — retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
