use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ProviderName;
use crate::media::base64_bytes;

/// Longest context document kept, in characters.
pub const CONTEXT_MAX_CHARS: usize = 30_000;
const CONTEXT_TRUNCATION_MARKER: &str = "\n\n[... document truncated ...]";

/// One entry of `ideas.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: u64,
    pub idea: String,
    #[serde(default)]
    pub used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Pending,
    Published,
}

/// What happened to the expert face while the image was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaceOutcome {
    #[default]
    NotRequested,
    /// Face passed as a reference in the image call itself.
    Inline { provider: ProviderName },
    /// Separate swap call succeeded.
    Swapped { provider: ProviderName },
    /// A face was wanted but the image went out without it.
    Degraded {
        provider: ProviderName,
        reason: String,
    },
}

impl FaceOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FaceOutcome::Degraded { .. })
    }
}

/// The single pending post, as kept in `pending_post.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub idea: String,
    #[serde(default)]
    pub idea_id: Option<u64>,
    pub post_text: String,
    pub image_prompt: String,
    /// JPEG, quality 85.
    #[serde(rename = "image_base64", with = "base64_bytes")]
    pub image: Vec<u8>,
    pub text_provider: ProviderName,
    pub image_provider: ProviderName,
    #[serde(default)]
    pub face: FaceOutcome,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_ids: Vec<i64>,
}

impl Draft {
    pub fn is_pending(&self) -> bool {
        self.status == DraftStatus::Pending
    }

    pub fn mark_published(&mut self, message_ids: Vec<i64>, at: DateTime<Utc>) {
        self.status = DraftStatus::Published;
        self.published_at = Some(at);
        self.message_ids = message_ids;
    }
}

/// One line of `history.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "date")]
    pub published_at: DateTime<Utc>,
    pub idea: String,
    pub post_text: String,
    /// The JPEG that went out with the post.
    #[serde(rename = "image_base64", with = "base64_bytes", default)]
    pub image: Vec<u8>,
    pub text_provider: ProviderName,
    pub image_provider: ProviderName,
    #[serde(default)]
    pub face: FaceOutcome,
    #[serde(default)]
    pub message_ids: Vec<i64>,
}

impl From<&Draft> for HistoryEntry {
    fn from(draft: &Draft) -> Self {
        Self {
            published_at: draft.published_at.unwrap_or_else(Utc::now),
            idea: draft.idea.clone(),
            post_text: draft.post_text.clone(),
            image: draft.image.clone(),
            text_provider: draft.text_provider,
            image_provider: draft.image_provider,
            face: draft.face.clone(),
            message_ids: draft.message_ids.clone(),
        }
    }
}

/// `expert_face.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertFace {
    #[serde(rename = "image_base64", with = "base64_bytes")]
    pub image: Vec<u8>,
}

/// `prompts.json`. Unset fields fall back to the built-in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PromptOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt_template: Option<String>,
}

/// `prompt_context.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub filename: String,
    pub text: String,
}

impl ContextDocument {
    /// Caps `text` at [`CONTEXT_MAX_CHARS`], marking the cut.
    pub fn new(filename: impl Into<String>, text: &str) -> Self {
        let text = text.trim();
        let text = match text.char_indices().nth(CONTEXT_MAX_CHARS) {
            Some((cut, _)) => format!("{}{CONTEXT_TRUNCATION_MARKER}", &text[..cut]),
            None => text.to_string(),
        };
        Self {
            filename: filename.into(),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_is_truncated_on_char_boundary() {
        let long = "я".repeat(CONTEXT_MAX_CHARS + 5);
        let doc = ContextDocument::new("a.txt", &long);
        assert!(doc.text.ends_with(CONTEXT_TRUNCATION_MARKER));
        assert_eq!(
            doc.text.chars().count(),
            CONTEXT_MAX_CHARS + CONTEXT_TRUNCATION_MARKER.chars().count()
        );

        let short = ContextDocument::new("b.txt", " short \n");
        assert_eq!(short.text, "short");
    }

    #[test]
    fn face_outcome_is_tagged() {
        let degraded = FaceOutcome::Degraded {
            provider: ProviderName::Replicate,
            reason: "timeout".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&degraded).unwrap(),
            json!({"kind": "degraded", "provider": "replicate", "reason": "timeout"})
        );
        assert_eq!(
            serde_json::to_value(FaceOutcome::NotRequested).unwrap(),
            json!({"kind": "not_requested"})
        );
    }

    #[test]
    fn ideas_without_used_flag_are_unused() {
        let idea: Idea = serde_json::from_value(json!({"id": 3, "idea": "sleep"})).unwrap();
        assert!(!idea.used);
    }

    #[test]
    fn older_history_lines_still_load() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "date": "2026-02-01T10:00:00Z",
            "idea": "sleep",
            "post_text": "text",
            "text_provider": "claude",
            "image_provider": "gemini"
        }))
        .unwrap();
        assert!(entry.image.is_empty());
        assert_eq!(entry.face, FaceOutcome::NotRequested);
    }
}
