//! Turns an idea into a draft: text, then image, then (maybe) a face.

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::{FaceStrategy, ProviderName};
use crate::compose::{self, ComposedPost};
use crate::config::ProviderSelection;
use crate::error::GenerateError;
use crate::media;
use crate::providers::Providers;
use crate::store::{
    ContextDocument, Draft, DraftStatus, ExpertFace, FaceOutcome, Idea, PromptOverrides,
};
use crate::utils::logging::preview;

/// Inputs for one draft.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub idea: &'a Idea,
    pub face: Option<&'a ExpertFace>,
    pub prompts: &'a PromptOverrides,
    pub context: Option<&'a ContextDocument>,
}

pub struct Orchestrator<'a> {
    providers: &'a Providers,
    selection: &'a ProviderSelection,
}

impl<'a> Orchestrator<'a> {
    pub fn new(providers: &'a Providers, selection: &'a ProviderSelection) -> Self {
        Self {
            providers,
            selection,
        }
    }

    /// Builds a pending draft. Nothing is persisted.
    ///
    /// Text and image failures abort; a failed face swap leaves the unswapped image in place.
    pub async fn generate(&self, req: GenerationRequest<'_>) -> Result<Draft, GenerateError> {
        let post = self.write_post(&req).await?;

        let (image, face) = self.render_image(&post.image_prompt, req.face).await?;
        info!(bytes = image.len(), face = ?face, "Image ready");

        Ok(Draft {
            status: DraftStatus::Pending,
            created_at: Utc::now(),
            idea: req.idea.idea.clone(),
            idea_id: Some(req.idea.id),
            post_text: post.text,
            image_prompt: post.image_prompt,
            image,
            text_provider: self.providers.text.name(),
            image_provider: self.providers.image.name(),
            face,
            published_at: None,
            message_ids: Vec::new(),
        })
    }

    async fn write_post(&self, req: &GenerationRequest<'_>) -> Result<ComposedPost, GenerateError> {
        let prompt = compose::text_prompt(&req.idea.idea, req.prompts, req.context);
        let text = self.providers.text.name();
        info!(provider = %text, idea = %req.idea.idea, "Generating post text");

        let response = self
            .providers
            .text
            .complete(&prompt.system, &prompt.user)
            .await
            .map_err(GenerateError::Text)?;

        let post = compose::parse_response(&response, &req.idea.idea, req.prompts);
        info!(
            provider = %text,
            chars = post.text.chars().count(),
            image_prompt = %preview(&post.image_prompt, 100),
            "Post text generated"
        );
        Ok(post)
    }

    /// Final JPEG plus what happened to the face. Every path encodes exactly once.
    async fn render_image(
        &self,
        prompt: &str,
        face: Option<&ExpertFace>,
    ) -> Result<(Vec<u8>, FaceOutcome), GenerateError> {
        let image = &self.providers.image;

        match (self.selection.face_strategy(), face) {
            (FaceStrategy::Plain, _) => {
                Ok((self.plain_image(prompt).await?, FaceOutcome::NotRequested))
            }
            (wanted, None) => {
                let provider = self.face_provider();
                warn!(
                    strategy = ?wanted,
                    %provider,
                    "No expert face stored, generating without a face"
                );
                let jpeg = self.plain_image(prompt).await?;
                Ok((
                    jpeg,
                    FaceOutcome::Degraded {
                        provider,
                        reason: "no expert face stored".to_string(),
                    },
                ))
            }
            (FaceStrategy::Inline, Some(face)) => {
                info!(provider = %image.name(), "Generating image with inline reference face");
                let raw = image
                    .generate(prompt, Some(&face.image))
                    .await
                    .map_err(GenerateError::Image)?;
                Ok((
                    media::to_jpeg(&raw)?,
                    FaceOutcome::Inline {
                        provider: image.name(),
                    },
                ))
            }
            (FaceStrategy::TwoCall(provider), Some(face)) => {
                let jpeg = self.plain_image(prompt).await?;
                match self.swap_face(provider, &jpeg, &face.image).await {
                    Ok(swapped) => Ok((swapped, FaceOutcome::Swapped { provider })),
                    Err(reason) => {
                        warn!(
                            %provider,
                            %reason,
                            "Face swap failed, keeping the original image"
                        );
                        Ok((jpeg, FaceOutcome::Degraded { provider, reason }))
                    }
                }
            }
        }
    }

    /// Generated without a face, as JPEG.
    async fn plain_image(&self, prompt: &str) -> Result<Vec<u8>, GenerateError> {
        info!(provider = %self.providers.image.name(), "Generating image");
        let raw = self
            .providers
            .image
            .generate(prompt, None)
            .await
            .map_err(GenerateError::Image)?;
        Ok(media::to_jpeg(&raw)?)
    }

    /// Swapped image as JPEG, or the reason it could not be used.
    async fn swap_face(
        &self,
        provider: ProviderName,
        image: &[u8],
        face: &[u8],
    ) -> Result<Vec<u8>, String> {
        let Some(swapper) = &self.providers.face_swap else {
            return Err(format!("no {provider} face-swap client configured"));
        };

        info!(%provider, "Applying face swap");
        let swapped = swapper.swap(image, face).await.map_err(|e| e.to_string())?;
        media::to_jpeg(&swapped).map_err(|e| format!("face-swap result unusable: {e}"))
    }

    fn face_provider(&self) -> ProviderName {
        self.selection.face_swap.unwrap_or(self.selection.image)
    }
}
