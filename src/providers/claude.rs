use async_trait::async_trait;
use autoposter_schema::{AnthropicErrorBody, AnthropicMessage, MessagesRequest, MessagesResponse};
use backon::ExponentialBuilder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::TextGenerator;
use super::http::{build_client, endpoint};
use super::policy::read_json;
use super::upstream_retry::{retry_policy, send_with_retry};
use crate::catalog::ProviderName;
use crate::config::{ClaudeConfig, ProviderDefaults};
use crate::error::{ConfigError, ProviderError};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: ProviderName = ProviderName::Claude;

/// Anthropic Messages API.
pub struct ClaudeClient {
    client: reqwest::Client,
    messages_url: Url,
    headers: HeaderMap,
    model: String,
    max_tokens: u32,
    retry: ExponentialBuilder,
}

impl ClaudeClient {
    pub fn new(cfg: &ClaudeConfig, defaults: &ProviderDefaults) -> Result<Self, ConfigError> {
        let conn = cfg.connection(defaults);

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(&cfg.api_key).map_err(|_| ConfigError::InvalidValue {
                key: "providers.claude.api_key",
                value: "<redacted>".to_string(),
            })?,
        );
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        Ok(Self {
            client: build_client(&conn)?,
            messages_url: endpoint(&cfg.base_url, "/v1/messages")?,
            headers,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            retry: retry_policy(conn.retry_max_times),
        })
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    fn name(&self) -> ProviderName {
        PROVIDER
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(system_prompt.to_string()).filter(|s| !s.is_empty()),
            messages: vec![AnthropicMessage::user(user_message)],
        };

        let resp = send_with_retry(PROVIDER, self.retry, || {
            self.client
                .post(self.messages_url.clone())
                .headers(self.headers.clone())
                .json(&body)
        })
        .await?;

        let parsed: MessagesResponse = read_json::<_, AnthropicErrorBody>(PROVIDER, resp).await?;
        parsed
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no text block in message"))
    }
}
