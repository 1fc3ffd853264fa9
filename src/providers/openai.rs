use async_trait::async_trait;
use autoposter_schema::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImagesResponse, OpenaiErrorBody,
};
use backon::ExponentialBuilder;
use reqwest::multipart::{Form, Part};
use url::Url;

use super::http::{build_client, endpoint};
use super::policy::{download, read_json};
use super::upstream_retry::{retry_policy, send_with_retry};
use super::{ImageGenerator, TextGenerator};
use crate::catalog::ProviderName;
use crate::config::{OpenaiConfig, ProviderDefaults};
use crate::error::{ConfigError, ProviderError};
use crate::media;

const PROVIDER: ProviderName = ProviderName::Openai;

const REFERENCE_FACE_INSTRUCTION: &str = "The person in the provided photo must be the main \
character of the image; keep their face and identity recognisable.";

/// OpenAI chat completions plus the images API.
///
/// Plain prompts go to `images/generations`; anything carrying a face goes to the multipart
/// `images/edits` endpoint.
pub struct OpenaiClient {
    client: reqwest::Client,
    api_key: String,
    chat_url: Url,
    generations_url: Url,
    edits_url: Url,
    text_model: String,
    max_tokens: u32,
    image_model: String,
    edit_model: String,
    image_size: String,
    retry: ExponentialBuilder,
}

impl OpenaiClient {
    pub fn new(cfg: &OpenaiConfig, defaults: &ProviderDefaults) -> Result<Self, ConfigError> {
        let conn = cfg.connection(defaults);
        Ok(Self {
            client: build_client(&conn)?,
            api_key: cfg.api_key.clone(),
            chat_url: endpoint(&cfg.base_url, "/v1/chat/completions")?,
            generations_url: endpoint(&cfg.base_url, "/v1/images/generations")?,
            edits_url: endpoint(&cfg.base_url, "/v1/images/edits")?,
            text_model: cfg.text_model.clone(),
            max_tokens: cfg.max_tokens,
            image_model: cfg.image_model.clone(),
            edit_model: cfg.edit_model.clone(),
            image_size: cfg.image_size.clone(),
            retry: retry_policy(conn.retry_max_times),
        })
    }

    async fn first_image(&self, resp: ImagesResponse) -> Result<Vec<u8>, ProviderError> {
        let Some(data) = resp.data.into_iter().next() else {
            return Err(ProviderError::malformed(PROVIDER, "empty image list"));
        };

        if let Some(b64) = data.b64_json.as_deref() {
            return media::decode_base64(b64)
                .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()));
        }
        if let Some(url) = data.url.as_deref() {
            return download(PROVIDER, &self.client, url).await;
        }
        Err(ProviderError::malformed(PROVIDER, "image has neither b64_json nor url"))
    }

    /// `images/edits` with one or more input images (`image[]`).
    async fn edit(&self, prompt: &str, images: &[&[u8]]) -> Result<Vec<u8>, ProviderError> {
        let build_form = || {
            let mut form = Form::new()
                .text("model", self.edit_model.clone())
                .text("prompt", prompt.to_string())
                .text("size", self.image_size.clone())
                .text("quality", "high")
                .text("n", "1");
            for (idx, bytes) in images.iter().enumerate() {
                let mime = media::sniff_mime(bytes);
                let ext = mime.rsplit('/').next().unwrap_or("jpeg");
                let part = Part::bytes(bytes.to_vec())
                    .file_name(format!("image_{idx}.{ext}"))
                    .mime_str(mime)
                    .unwrap_or_else(|_| Part::bytes(bytes.to_vec()));
                form = form.part("image[]", part);
            }
            form
        };

        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(self.edits_url.clone())
                .bearer_auth(&self.api_key)
                .multipart(build_form())
        })
        .await?;

        let parsed: ImagesResponse = read_json::<_, OpenaiErrorBody>(PROVIDER, resp).await?;
        self.first_image(parsed).await
    }
}

#[async_trait]
impl TextGenerator for OpenaiClient {
    fn name(&self) -> ProviderName {
        PROVIDER
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.push(ChatMessage::user(user_message));

        let body = ChatCompletionRequest {
            model: self.text_model.clone(),
            max_tokens: Some(self.max_tokens),
            messages,
        };

        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(self.chat_url.clone())
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let parsed: ChatCompletionResponse =
            read_json::<_, OpenaiErrorBody>(PROVIDER, resp).await?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no message content"))
    }
}

#[async_trait]
impl ImageGenerator for OpenaiClient {
    fn name(&self) -> ProviderName {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        reference_face: Option<&[u8]>,
    ) -> Result<Vec<u8>, ProviderError> {
        if let Some(face) = reference_face {
            let prompt = format!("{prompt}\n\n{REFERENCE_FACE_INSTRUCTION}");
            return self.edit(&prompt, &[face]).await;
        }

        let body = ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            size: self.image_size.clone(),
            quality: Some("standard".to_string()),
            n: 1,
            response_format: Some("b64_json".to_string()),
        };

        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(self.generations_url.clone())
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let parsed: ImagesResponse = read_json::<_, OpenaiErrorBody>(PROVIDER, resp).await?;
        self.first_image(parsed).await
    }
}
