//! Exponential back-off with jitter for `YouTube` Data API calls.
//!
//! Only transient failures are retried. A quota rejection stops the caller
//! immediately: retrying would spend more of the same daily allowance.

use std::future::Future;
use std::time::Duration;

use crate::error::YoutubeError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth another attempt after a delay.
///
/// Retriable: timeouts, connection failures, HTTP 5xx and HTTP 429.
/// Everything else (quota, 4xx, malformed JSON, bad input) is final.
pub(crate) fn is_retriable(err: &YoutubeError) -> bool {
    match err {
        YoutubeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        YoutubeError::ApiError { status, .. } => *status >= 500 || *status == 429,
        YoutubeError::QuotaExceeded(_)
        | YoutubeError::Deserialize { .. }
        | YoutubeError::InvalidChannelUrl(_)
        | YoutubeError::ChannelNotFound(_)
        | YoutubeError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
fn base_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << (attempt - 1).min(10))
        .min(MAX_DELAY_MS)
}

/// Runs `operation`, retrying transient errors up to `max_retries` times.
///
/// With `backoff_base_ms = 1_000` the sleeps are roughly 1 s, 2 s, 4 s, each
/// scaled by a random factor in `[0.75, 1.25)` and capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, YoutubeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YoutubeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "YouTube API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
