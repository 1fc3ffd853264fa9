//! Persistence for ideas, the pending draft, history and operator assets.

mod json_file;
mod model;

pub use json_file::JsonFileStore;
pub use model::{
    CONTEXT_MAX_CHARS, ContextDocument, Draft, DraftStatus, ExpertFace, FaceOutcome,
    HistoryEntry, Idea, PromptOverrides,
};

use async_trait::async_trait;

use crate::error::StoreError;

/// Holds at most one pending draft.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Overwrites whatever draft is stored.
    async fn save(&self, draft: &Draft) -> Result<(), StoreError>;

    /// The draft awaiting publication, if any.
    async fn load(&self) -> Result<Option<Draft>, StoreError>;

    /// Appends `draft` to history and clears the pending slot.
    async fn archive(&self, draft: &Draft) -> Result<(), StoreError>;
}

#[async_trait]
pub trait IdeaPool: Send + Sync {
    /// First idea not yet used, in file order.
    async fn next_unused(&self) -> Result<Option<Idea>, StoreError>;

    async fn mark_used(&self, id: u64) -> Result<(), StoreError>;

    async fn add(&self, text: &str) -> Result<Idea, StoreError>;

    async fn list(&self) -> Result<Vec<Idea>, StoreError>;
}

/// Operator-managed inputs to generation: prompt overrides, the context
/// document and the expert's reference face.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Defaults when nothing was saved.
    async fn prompts(&self) -> Result<PromptOverrides, StoreError>;

    async fn set_prompts(&self, prompts: &PromptOverrides) -> Result<(), StoreError>;

    async fn context(&self) -> Result<Option<ContextDocument>, StoreError>;

    async fn set_context(&self, doc: &ContextDocument) -> Result<(), StoreError>;

    /// No-op when no document is attached.
    async fn clear_context(&self) -> Result<(), StoreError>;

    async fn expert_face(&self) -> Result<Option<ExpertFace>, StoreError>;

    async fn set_expert_face(&self, face: &ExpertFace) -> Result<(), StoreError>;
}
