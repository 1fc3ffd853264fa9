use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;

use crate::catalog::ProviderName;
use crate::error::{IsRetryable, ProviderError};
use crate::utils::logging::body_preview;

/// `max_times == 0` means a single attempt.
pub(crate) fn retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(4))
        .with_max_times(max_times)
        .with_jitter()
}

/// Sends the request produced by `build`, rebuilding it for each attempt.
///
/// Upstream 5xx answers are turned into errors here so they can be retried; any other status
/// is handed back to the caller untouched.
pub(crate) async fn send_with_retry<F>(
    provider: ProviderName,
    policy: ExponentialBuilder,
    build: F,
) -> Result<reqwest::Response, ProviderError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let build = &build;
    (|| async move {
        let resp = build()
            .send()
            .await
            .map_err(ProviderError::transport(provider))?;

        if resp.status().is_server_error() {
            let status = resp.status();
            let body = match resp.bytes().await {
                Ok(bytes) => body_preview(&bytes),
                Err(e) => format!("<failed to read body: {e}>"),
            };

            tracing::debug!(
                %provider,
                %status,
                body = %body,
                "[{provider}] Upstream server error"
            );
            return Err(ProviderError::UpstreamFallback {
                provider,
                status,
                body,
            });
        }

        Ok(resp)
    })
    .retry(policy)
    .when(ProviderError::is_retryable)
    .notify(|err: &ProviderError, dur: Duration| {
        tracing::warn!(
            %provider,
            error = %err,
            retry_in_ms = dur.as_millis() as u64,
            "[{provider}] Upstream call failed, retrying"
        );
    })
    .await
}
