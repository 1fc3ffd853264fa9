use async_trait::async_trait;
use autoposter_schema::{Prediction, PredictionRequest, PredictionStatus, ReplicateErrorBody};
use backon::ExponentialBuilder;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use super::FaceSwapper;
use super::http::{build_client, endpoint};
use super::policy::{download, read_json};
use super::upstream_retry::{retry_policy, send_with_retry};
use crate::catalog::ProviderName;
use crate::config::{ProviderDefaults, ReplicateConfig};
use crate::error::{ConfigError, ProviderError};
use crate::media;

const PROVIDER: ProviderName = ProviderName::Replicate;

/// Face swap through a Replicate prediction (`target_image` + `swap_image`).
pub struct ReplicateClient {
    client: reqwest::Client,
    api_key: String,
    predictions_url: Url,
    model_version: String,
    poll_interval: Duration,
    max_wait: Duration,
    retry: ExponentialBuilder,
}

impl ReplicateClient {
    pub fn new(cfg: &ReplicateConfig, defaults: &ProviderDefaults) -> Result<Self, ConfigError> {
        let conn = cfg.connection(defaults);
        Ok(Self {
            client: build_client(&conn)?,
            api_key: cfg.api_key.clone(),
            predictions_url: endpoint(&cfg.base_url, "/v1/predictions")?,
            model_version: cfg.model_version.clone(),
            poll_interval: Duration::from_secs(cfg.poll_interval_secs),
            max_wait: Duration::from_secs(cfg.max_wait_secs),
            retry: retry_policy(conn.retry_max_times),
        })
    }

    async fn poll(&self, url: &str) -> Result<Prediction, ProviderError> {
        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client.get(url).bearer_auth(&self.api_key)
        })
        .await?;
        read_json::<_, ReplicateErrorBody>(PROVIDER, resp).await
    }

    /// Polls until the prediction reaches a terminal status or `max_wait` elapses.
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction, ProviderError> {
        let deadline = Instant::now() + self.max_wait;

        while !prediction.status.is_terminal() {
            if Instant::now() >= deadline {
                return Err(ProviderError::PredictionTimeout {
                    provider: PROVIDER,
                    id: prediction.id,
                });
            }
            let Some(poll_url) = prediction.poll_url().map(str::to_string) else {
                return Err(ProviderError::malformed(
                    PROVIDER,
                    format!("prediction {} has no urls.get", prediction.id),
                ));
            };

            tokio::time::sleep(self.poll_interval).await;
            prediction = self.poll(&poll_url).await?;
            tracing::debug!(
                id = %prediction.id,
                status = ?prediction.status,
                "[{PROVIDER}] Prediction polled"
            );
        }

        Ok(prediction)
    }
}

#[async_trait]
impl FaceSwapper for ReplicateClient {
    fn name(&self) -> ProviderName {
        PROVIDER
    }

    async fn swap(&self, image: &[u8], face: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let body = PredictionRequest {
            version: self.model_version.clone(),
            input: json!({
                "target_image": media::data_uri(image),
                "swap_image": media::data_uri(face),
            }),
        };

        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(self.predictions_url.clone())
                .bearer_auth(&self.api_key)
                .header("Prefer", "wait")
                .json(&body)
        })
        .await?;

        let created: Prediction = read_json::<_, ReplicateErrorBody>(PROVIDER, resp).await?;
        let prediction = self.wait_for(created).await?;

        if prediction.status != PredictionStatus::Succeeded {
            let detail = prediction
                .error
                .as_ref()
                .map_or_else(|| "no error detail".to_string(), ToString::to_string);
            return Err(ProviderError::PredictionFailed {
                provider: PROVIDER,
                id: prediction.id,
                status: format!("{:?}", prediction.status).to_lowercase(),
                detail,
            });
        }

        let Some(output_url) = prediction.output_url() else {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!("prediction {} succeeded without output", prediction.id),
            ));
        };

        download(PROVIDER, &self.client, output_url).await
    }
}
