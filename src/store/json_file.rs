use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::model::{
    ContextDocument, Draft, DraftStatus, ExpertFace, HistoryEntry, Idea, PromptOverrides,
};
use super::{AssetStore, DraftStore, IdeaPool};
use crate::error::StoreError;

pub const IDEAS_FILE: &str = "ideas.json";
pub const PENDING_FILE: &str = "pending_post.json";
pub const HISTORY_FILE: &str = "history.json";
pub const EXPERT_FACE_FILE: &str = "expert_face.json";
pub const PROMPTS_FILE: &str = "prompts.json";
pub const CONTEXT_FILE: &str = "prompt_context.json";

/// JSON documents under one data directory, each read and rewritten whole.
///
/// There is no locking: one process per phase is assumed.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// `None` when the file does not exist.
    async fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StoreError> {
        let path = self.path(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    /// Pretty JSON via a sibling temp file and a rename.
    async fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path(file);
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Store file written");
        Ok(())
    }

    async fn remove(&self, file: &str) -> Result<(), StoreError> {
        let path = self.path(file);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn ideas(&self) -> Result<Vec<Idea>, StoreError> {
        Ok(self.read(IDEAS_FILE).await?.unwrap_or_default())
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.read(HISTORY_FILE).await?.unwrap_or_default())
    }

    /// Last draft record whatever its status.
    pub async fn last_draft(&self) -> Result<Option<Draft>, StoreError> {
        self.read(PENDING_FILE).await
    }

    /// Rewrites the pending record in place, e.g. after a manual text edit.
    pub async fn replace_pending(&self, draft: &Draft) -> Result<(), StoreError> {
        self.write(PENDING_FILE, draft).await
    }
}

#[async_trait]
impl DraftStore for JsonFileStore {
    async fn save(&self, draft: &Draft) -> Result<(), StoreError> {
        if let Some(previous) = self.load().await? {
            warn!(
                idea = %previous.idea,
                created_at = %previous.created_at,
                "Previous draft was never published, overwriting"
            );
        }
        self.write(PENDING_FILE, draft).await
    }

    async fn load(&self) -> Result<Option<Draft>, StoreError> {
        Ok(self
            .read::<Draft>(PENDING_FILE)
            .await?
            .filter(Draft::is_pending))
    }

    async fn archive(&self, draft: &Draft) -> Result<(), StoreError> {
        let mut record = draft.clone();
        record.status = DraftStatus::Published;
        if record.published_at.is_none() {
            record.published_at = Some(Utc::now());
        }

        // Pending first: a failed history append must not leave a sent draft publishable.
        self.write(PENDING_FILE, &record).await?;

        let mut history = self.history().await?;
        history.push(HistoryEntry::from(&record));
        self.write(HISTORY_FILE, &history).await
    }
}

#[async_trait]
impl IdeaPool for JsonFileStore {
    async fn next_unused(&self) -> Result<Option<Idea>, StoreError> {
        Ok(self.ideas().await?.into_iter().find(|idea| !idea.used))
    }

    async fn mark_used(&self, id: u64) -> Result<(), StoreError> {
        let mut ideas = self.ideas().await?;
        let idea = ideas
            .iter_mut()
            .find(|idea| idea.id == id)
            .ok_or(StoreError::IdeaNotFound(id))?;
        idea.used = true;
        self.write(IDEAS_FILE, &ideas).await
    }

    async fn add(&self, text: &str) -> Result<Idea, StoreError> {
        let mut ideas = self.ideas().await?;
        let idea = Idea {
            id: ideas.iter().map(|i| i.id).max().map_or(1, |max| max + 1),
            idea: text.trim().to_string(),
            used: false,
        };
        ideas.push(idea.clone());
        self.write(IDEAS_FILE, &ideas).await?;
        Ok(idea)
    }

    async fn list(&self) -> Result<Vec<Idea>, StoreError> {
        self.ideas().await
    }
}

#[async_trait]
impl AssetStore for JsonFileStore {
    async fn prompts(&self) -> Result<PromptOverrides, StoreError> {
        Ok(self.read(PROMPTS_FILE).await?.unwrap_or_default())
    }

    async fn set_prompts(&self, prompts: &PromptOverrides) -> Result<(), StoreError> {
        self.write(PROMPTS_FILE, prompts).await
    }

    async fn context(&self) -> Result<Option<ContextDocument>, StoreError> {
        self.read(CONTEXT_FILE).await
    }

    async fn set_context(&self, doc: &ContextDocument) -> Result<(), StoreError> {
        self.write(CONTEXT_FILE, doc).await
    }

    async fn clear_context(&self) -> Result<(), StoreError> {
        self.remove(CONTEXT_FILE).await
    }

    async fn expert_face(&self) -> Result<Option<ExpertFace>, StoreError> {
        self.read(EXPERT_FACE_FILE).await
    }

    async fn set_expert_face(&self, face: &ExpertFace) -> Result<(), StoreError> {
        self.write(EXPERT_FACE_FILE, face).await
    }
}
