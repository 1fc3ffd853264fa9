use async_trait::async_trait;
use autoposter_schema::{
    Content, GeminiErrorBody, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};
use backon::ExponentialBuilder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::http::{build_client, endpoint};
use super::policy::read_json;
use super::upstream_retry::{retry_policy, send_with_retry};
use super::{ImageGenerator, TextGenerator};
use crate::catalog::ProviderName;
use crate::config::{GeminiConfig, ProviderDefaults};
use crate::error::{ConfigError, ProviderError};
use crate::media;

const PROVIDER: ProviderName = ProviderName::Gemini;

const REFERENCE_FACE_INSTRUCTION: &str = "Use the person in the attached reference photo as \
the main character of the image. Keep their face, facial features and identity exactly as in \
the reference.";

/// Gemini `generateContent`, used for text and images.
pub struct GeminiClient {
    client: reqwest::Client,
    headers: HeaderMap,
    text_url: Url,
    image_url: Url,
    retry: ExponentialBuilder,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig, defaults: &ProviderDefaults) -> Result<Self, ConfigError> {
        let conn = cfg.connection(defaults);

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-goog-api-key"),
            HeaderValue::from_str(&cfg.api_key).map_err(|_| ConfigError::InvalidValue {
                key: "providers.gemini.api_key",
                value: "<redacted>".to_string(),
            })?,
        );

        let model_url =
            |model: &str| endpoint(&cfg.base_url, &format!("/v1beta/models/{model}:generateContent"));

        Ok(Self {
            client: build_client(&conn)?,
            headers,
            text_url: model_url(&cfg.text_model)?,
            image_url: model_url(&cfg.image_model)?,
            retry: retry_policy(conn.retry_max_times),
        })
    }

    async fn call(
        &self,
        url: &Url,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(url.clone())
                .headers(self.headers.clone())
                .json(body)
        })
        .await?;

        read_json::<_, GeminiErrorBody>(PROVIDER, resp).await
    }

    async fn call_for_image(&self, parts: Vec<Part>) -> Result<Vec<u8>, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig::image_only()),
        };

        let resp = self.call(&self.image_url, &body).await?;
        let Some(inline) = resp.first_inline_data() else {
            let reason = resp.finish_reason().unwrap_or("unknown");
            return Err(ProviderError::malformed(
                PROVIDER,
                format!("no image in response (finishReason: {reason})"),
            ));
        };

        media::decode_base64(&inline.data)
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))
    }
}

fn image_part(bytes: &[u8]) -> Part {
    Part::inline(media::sniff_mime(bytes), media::encode_base64(bytes))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> ProviderName {
        PROVIDER
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderError> {
        let prompt = if system_prompt.is_empty() {
            user_message.to_string()
        } else {
            format!("{system_prompt}\n\n{user_message}")
        };

        let body = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: None,
        };

        self.call(&self.text_url, &body)
            .await?
            .text()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no text in response"))
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    fn name(&self) -> ProviderName {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        reference_face: Option<&[u8]>,
    ) -> Result<Vec<u8>, ProviderError> {
        let parts = match reference_face {
            Some(face) => vec![
                Part::text(format!("{prompt}\n\n{REFERENCE_FACE_INSTRUCTION}")),
                image_part(face),
            ],
            None => vec![Part::text(prompt)],
        };

        self.call_for_image(parts).await
    }
}
