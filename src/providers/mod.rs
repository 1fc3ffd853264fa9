//! Vendor clients behind three small traits, one per job.

pub mod claude;
pub mod gemini;
pub mod openai;
pub mod replicate;

mod bootstrap;
pub(crate) mod http;
pub(crate) mod policy;
pub(crate) mod upstream_retry;

pub use bootstrap::Providers;

use async_trait::async_trait;

use crate::catalog::ProviderName;
use crate::error::ProviderError;

/// Prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> ProviderName;

    async fn complete(&self, system_prompt: &str, user_message: &str)
    -> Result<String, ProviderError>;
}

/// Prompt (plus an optional reference face) in, image bytes out.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> ProviderName;

    /// `reference_face` is only ever `Some` on the inline face path.
    async fn generate(
        &self,
        prompt: &str,
        reference_face: Option<&[u8]>,
    ) -> Result<Vec<u8>, ProviderError>;
}

/// Puts the reference face into an already generated image.
#[async_trait]
pub trait FaceSwapper: Send + Sync {
    fn name(&self) -> ProviderName;

    async fn swap(&self, image: &[u8], face: &[u8]) -> Result<Vec<u8>, ProviderError>;
}
