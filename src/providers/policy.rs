use autoposter_schema::{AnthropicErrorBody, GeminiErrorBody, OpenaiErrorBody, ReplicateErrorBody};
use serde::{Serialize, de::DeserializeOwned};

use crate::catalog::ProviderName;
use crate::error::ProviderError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};

/// A vendor's structured error payload.
pub(crate) trait UpstreamErrorBody: std::fmt::Debug + DeserializeOwned + Serialize {
    fn message(&self) -> String;
}

impl UpstreamErrorBody for GeminiErrorBody {
    fn message(&self) -> String {
        match &self.inner.status {
            Some(status) => format!("{status}: {}", self.inner.message),
            None => self.inner.message.clone(),
        }
    }
}

impl UpstreamErrorBody for OpenaiErrorBody {
    fn message(&self) -> String {
        match &self.error.kind {
            Some(kind) => format!("{kind}: {}", self.error.message),
            None => self.error.message.clone(),
        }
    }
}

impl UpstreamErrorBody for AnthropicErrorBody {
    fn message(&self) -> String {
        format!("{}: {}", self.error.kind, self.error.message)
    }
}

impl UpstreamErrorBody for ReplicateErrorBody {
    fn message(&self) -> String {
        match &self.title {
            Some(title) => format!("{title}: {}", self.detail),
            None => self.detail.clone(),
        }
    }
}

/// Maps a non-success response to a [`ProviderError`], preferring the vendor's own message.
pub(crate) async fn classify_upstream_error<E>(
    provider: ProviderName,
    resp: reqwest::Response,
) -> ProviderError
where
    E: UpstreamErrorBody,
{
    let status = resp.status();
    let bytes = resp.bytes().await.unwrap_or_default();

    if let Ok(error) = serde_json::from_slice::<E>(&bytes) {
        with_pretty_json_debug(&error, |pretty_error| {
            tracing::debug!(
                %provider,
                %status,
                body = %pretty_error,
                "Upstream structured error"
            );
        });

        return ProviderError::Upstream {
            provider,
            status,
            message: error.message(),
        };
    }

    let body = body_preview(&bytes);
    tracing::debug!(
        %provider,
        %status,
        body = %body,
        "Upstream unstructured error"
    );

    ProviderError::UpstreamFallback {
        provider,
        status,
        body,
    }
}

/// Success → parsed `T`; anything else → classified error.
pub(crate) async fn read_json<T, E>(
    provider: ProviderName,
    resp: reqwest::Response,
) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
    E: UpstreamErrorBody,
{
    if !resp.status().is_success() {
        return Err(classify_upstream_error::<E>(provider, resp).await);
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(ProviderError::transport(provider))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        ProviderError::malformed(
            provider,
            format!("{e}; body: {}", body_preview(&bytes)),
        )
    })
}

/// Fetches a result file (image URL handed out by the vendor).
pub(crate) async fn download(
    provider: ProviderName,
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, ProviderError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(ProviderError::transport(provider))?;

    let status = resp.status();
    if !status.is_success() {
        let bytes = resp.bytes().await.unwrap_or_default();
        return Err(ProviderError::UpstreamFallback {
            provider,
            status,
            body: body_preview(&bytes),
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(ProviderError::transport(provider))?;
    Ok(bytes.to_vec())
}
