use reqwest::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;
use crate::catalog::ProviderName;

/// Failure of a single upstream call (text, image, face swap or channel).
#[derive(Debug, ThisError)]
pub enum ProviderError {
    /// Upstream answered with a structured error body we could read.
    #[error("[{provider}] upstream error: status={status}, message={message}")]
    Upstream {
        provider: ProviderName,
        status: StatusCode,
        message: String,
    },

    /// Upstream answered with a non-success status and an unstructured body.
    #[error("[{provider}] upstream fallback error: status={status}, body={body:.200}")]
    UpstreamFallback {
        provider: ProviderName,
        status: StatusCode,
        body: String,
    },

    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("[{provider}] HTTP request error: {source}")]
    Transport {
        provider: ProviderName,
        #[source]
        source: reqwest::Error,
    },

    /// The call succeeded but the payload did not contain what we asked for.
    #[error("[{provider}] unexpected response: {message}")]
    MalformedResponse {
        provider: ProviderName,
        message: String,
    },

    #[error("[{provider}] prediction {id} ended with status {status}: {detail}")]
    PredictionFailed {
        provider: ProviderName,
        id: String,
        status: String,
        detail: String,
    },

    #[error("[{provider}] gave up waiting for prediction {id}")]
    PredictionTimeout { provider: ProviderName, id: String },
}

impl ProviderError {
    pub fn malformed(provider: ProviderName, message: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            provider,
            message: message.into(),
        }
    }

    pub fn transport(provider: ProviderName) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Transport { provider, source }
    }
}

impl IsRetryable for ProviderError {
    fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ProviderError::Upstream { status, .. }
            | ProviderError::UpstreamFallback { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable_but_client_errors_are_not() {
        let server = ProviderError::UpstreamFallback {
            provider: ProviderName::Gemini,
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        let client = ProviderError::Upstream {
            provider: ProviderName::Openai,
            status: StatusCode::BAD_REQUEST,
            message: "invalid model".to_string(),
        };

        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!ProviderError::malformed(ProviderName::Claude, "empty").is_retryable());
    }

    #[test]
    fn display_names_the_provider() {
        let err = ProviderError::malformed(ProviderName::Replicate, "no output url");
        assert_eq!(
            err.to_string(),
            "[replicate] unexpected response: no output url"
        );
    }
}
