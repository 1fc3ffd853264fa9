//! The two phases: draft generation and publication.

use chrono::Utc;
use tracing::info;

use crate::config::ProviderSelection;
use crate::error::AutoposterError;
use crate::orchestrator::{GenerationRequest, Orchestrator};
use crate::providers::Providers;
use crate::publish::{Channel, PublishReceipt, Publisher};
use crate::store::{AssetStore, Draft, DraftStore, IdeaPool};

#[derive(Debug)]
pub enum GenerateOutcome {
    /// Every idea has been used.
    NoIdeas,
    Drafted(Draft),
}

#[derive(Debug)]
pub enum PublishOutcome {
    /// `AUTOPUBLISH_ENABLED` is off and the run was not forced.
    Disabled,
    NothingPending,
    Published {
        idea: String,
        receipt: PublishReceipt,
    },
}

/// Runs the phases against any store; the JSON file store is the one the CLI uses.
pub struct Pipeline<'a, S> {
    store: &'a S,
    selection: &'a ProviderSelection,
}

impl<'a, S> Pipeline<'a, S>
where
    S: DraftStore + IdeaPool + AssetStore,
{
    pub fn new(store: &'a S, selection: &'a ProviderSelection) -> Self {
        Self { store, selection }
    }

    /// Phase one: next unused idea → draft in the pending slot. The idea is consumed.
    pub async fn generate(&self, providers: &Providers) -> Result<GenerateOutcome, AutoposterError> {
        let Some(idea) = self.store.next_unused().await? else {
            info!("No unused ideas left");
            return Ok(GenerateOutcome::NoIdeas);
        };
        info!(id = idea.id, idea = %idea.idea, "Generating draft");

        let prompts = self.store.prompts().await?;
        let context = self.store.context().await?;
        if let Some(doc) = &context {
            info!(
                filename = %doc.filename,
                chars = doc.text.chars().count(),
                "Context document loaded"
            );
        }
        let face = match self.selection.face_swap {
            Some(_) => self.store.expert_face().await?,
            None => None,
        };

        let draft = Orchestrator::new(providers, self.selection)
            .generate(GenerationRequest {
                idea: &idea,
                face: face.as_ref(),
                prompts: &prompts,
                context: context.as_ref(),
            })
            .await?;

        self.store.save(&draft).await?;
        self.store.mark_used(idea.id).await?;
        info!(id = idea.id, "Draft saved, ready for review");

        Ok(GenerateOutcome::Drafted(draft))
    }

    /// Phase two: sends the pending draft, then archives it.
    pub async fn publish<C: Channel>(
        &self,
        publisher: &Publisher<C>,
        force: bool,
    ) -> Result<PublishOutcome, AutoposterError> {
        if !self.selection.autopublish_enabled && !force {
            info!("Autopublish disabled, skipping");
            return Ok(PublishOutcome::Disabled);
        }

        let Some(mut draft) = self.store.load().await? else {
            info!("No pending draft, nothing to publish");
            return Ok(PublishOutcome::NothingPending);
        };
        info!(idea = %draft.idea, "Publishing draft");

        let receipt = publisher.publish(&draft.image, &draft.post_text).await?;

        draft.mark_published(receipt.message_ids.clone(), Utc::now());
        self.store.archive(&draft).await?;
        info!(message_ids = ?receipt.message_ids, "Draft archived");

        Ok(PublishOutcome::Published {
            idea: draft.idea,
            receipt,
        })
    }

    /// Both phases back to back, ignoring the autopublish switch.
    pub async fn full<C: Channel>(
        &self,
        providers: &Providers,
        publisher: &Publisher<C>,
    ) -> Result<(GenerateOutcome, Option<PublishOutcome>), AutoposterError> {
        let generated = self.generate(providers).await?;
        if matches!(generated, GenerateOutcome::NoIdeas) {
            return Ok((generated, None));
        }
        let published = self.publish(publisher, true).await?;
        Ok((generated, Some(published)))
    }
}
