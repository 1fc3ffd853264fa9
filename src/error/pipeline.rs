use reqwest::StatusCode;
use thiserror::Error as ThisError;

use super::{ConfigError, ProviderError, StoreError};
use crate::media::MediaError;

/// Aborts a draft creation attempt. Face-swap failures never surface here.
#[derive(Debug, ThisError)]
pub enum GenerateError {
    #[error("Text generation failed: {0}")]
    Text(#[source] ProviderError),

    #[error("Image generation failed: {0}")]
    Image(#[source] ProviderError),

    #[error("Generated image is unusable: {0}")]
    Media(#[from] MediaError),
}

/// Aborts a publish attempt; left for the operator to retry.
#[derive(Debug, ThisError)]
pub enum PublishError {
    #[error("Channel rejected the post: status={status}, code={code:?}, description={description}")]
    Rejected {
        status: StatusCode,
        code: Option<i64>,
        description: String,
    },

    #[error("Channel request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Unexpected channel response: {0}")]
    Malformed(String),
}

/// Top-level error surfaced by the binary.
#[derive(Debug, ThisError)]
pub enum AutoposterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Media(#[from] MediaError),
}
