use async_trait::async_trait;
use autoposter::catalog::ProviderName;
use autoposter::config::{ProviderDefaults, ProviderSelection, TelegramConfig};
use autoposter::error::{AutoposterError, ProviderError, PublishError, StoreError};
use autoposter::pipeline::{GenerateOutcome, Pipeline, PublishOutcome};
use autoposter::providers::{FaceSwapper, ImageGenerator, Providers, TextGenerator};
use autoposter::publish::{Publisher, TelegramChannel};
use autoposter::store::{
    AssetStore, ContextDocument, Draft, DraftStatus, DraftStore, ExpertFace, FaceOutcome,
    HistoryEntry, Idea, IdeaPool, JsonFileStore, PromptOverrides,
};
use axum::{Json, Router, extract::State, routing::post};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use url::Url;

fn unique_data_dir(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut dir = std::env::temp_dir();
    dir.push(format!("autoposter-{prefix}-{}-{}", std::process::id(), nanos));
    dir
}

fn png(shade: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(6, 6, Rgb([shade, 0, 0]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Echoes the prompts it was given so the test can see them in the draft.
#[derive(Default)]
struct EchoText {
    seen: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl TextGenerator for EchoText {
    fn name(&self) -> ProviderName {
        ProviderName::Openai
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        self.seen
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        Ok(format!("Post about: {user}"))
    }
}

#[derive(Default)]
struct PlainImage {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageGenerator for PlainImage {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    async fn generate(
        &self,
        prompt: &str,
        reference_face: Option<&[u8]>,
    ) -> Result<Vec<u8>, ProviderError> {
        assert!(reference_face.is_none(), "two-call path never passes a reference");
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(png(30))
    }
}

struct BrokenSwap;

#[async_trait]
impl FaceSwapper for BrokenSwap {
    fn name(&self) -> ProviderName {
        ProviderName::Replicate
    }

    async fn swap(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::PredictionTimeout {
            provider: ProviderName::Replicate,
            id: "slow".to_string(),
        })
    }
}

#[derive(Clone, Default)]
struct Sent(Arc<Mutex<Vec<String>>>);

async fn telegram(State(sent): State<Sent>, body: axum::body::Bytes) -> Json<Value> {
    let mut sent = sent.0.lock().unwrap();
    sent.push(String::from_utf8_lossy(&body).into_owned());
    Json(json!({ "ok": true, "result": { "message_id": 500 + sent.len() } }))
}

async fn telegram_rejecting(State(sent): State<Sent>, body: axum::body::Bytes) -> Json<Value> {
    sent.0
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(&body).into_owned());
    Json(json!({
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: chat not found"
    }))
}

async fn spawn_telegram(sent: Sent) -> Url {
    let app = Router::new()
        .route("/bottok/sendPhoto", post(telegram))
        .route("/bottok/sendMessage", post(telegram))
        .with_state(sent);
    serve(app).await
}

async fn spawn_rejecting_telegram(sent: Sent) -> Url {
    let app = Router::new()
        .route("/bottok/sendPhoto", post(telegram_rejecting))
        .route("/bottok/sendMessage", post(telegram_rejecting))
        .with_state(sent);
    serve(app).await
}

fn publisher_for(base: Url) -> Publisher<TelegramChannel> {
    let cfg = TelegramConfig {
        bot_token: "tok".to_string(),
        channel_id: "@skin".to_string(),
        api_url: base,
        ..TelegramConfig::default()
    };
    Publisher::new(
        TelegramChannel::new(&cfg, &ProviderDefaults::default()).unwrap(),
        cfg.caption_limit,
    )
}

async fn serve(app: Router) -> Url {    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    Url::parse(&format!("http://{addr}")).expect("valid base url")
}

#[tokio::test]
async fn generate_then_publish_with_degraded_face() {
    let dir = unique_data_dir("pipeline");
    let store = JsonFileStore::new(&dir);
    store.add("Vitamin C serums").await.unwrap();
    store.add("Sleep and skin").await.unwrap();
    store
        .set_prompts(&PromptOverrides {
            system_prompt: Some("Custom system".to_string()),
            image_prompt_template: Some("Macro shot: {idea}".to_string()),
        })
        .await
        .unwrap();
    store
        .set_expert_face(&ExpertFace { image: png(250) })
        .await
        .unwrap();

    let selection = ProviderSelection {
        text: ProviderName::Openai,
        image: ProviderName::Gemini,
        face_swap: Some(ProviderName::Replicate),
        autopublish_enabled: false,
    };
    let text = Arc::new(EchoText::default());
    let image_gen = Arc::new(PlainImage::default());
    let providers = Providers {
        text: text.clone(),
        image: image_gen.clone(),
        face_swap: Some(Arc::new(BrokenSwap)),
    };
    let pipeline = Pipeline::new(&store, &selection);

    // Phase 1.
    let GenerateOutcome::Drafted(draft) = pipeline.generate(&providers).await.unwrap() else {
        panic!("an idea was available");
    };
    assert_eq!(draft.idea, "Vitamin C serums");
    assert_eq!(
        draft.post_text,
        "Post about: Write a post on the topic: Vitamin C serums"
    );
    assert_eq!(draft.image_prompt, "Macro shot: Vitamin C serums");
    assert!(matches!(
        draft.face,
        FaceOutcome::Degraded {
            provider: ProviderName::Replicate,
            ..
        }
    ));
    assert!(image::load_from_memory(&draft.image).is_ok());
    assert_eq!(text.seen.lock().unwrap()[0].0, "Custom system");
    assert_eq!(image_gen.prompts.lock().unwrap().len(), 1);

    assert_eq!(store.load().await.unwrap().as_ref(), Some(&draft));
    assert_eq!(
        store.next_unused().await.unwrap().map(|i| i.idea),
        Some("Sleep and skin".to_string())
    );

    // Phase 2.
    let sent = Sent::default();
    let publisher = publisher_for(spawn_telegram(sent.clone()).await);

    let outcome = pipeline.publish(&publisher, false).await.unwrap();
    assert!(matches!(outcome, PublishOutcome::Disabled));
    assert!(sent.0.lock().unwrap().is_empty());

    let outcome = pipeline.publish(&publisher, true).await.unwrap();
    let PublishOutcome::Published { idea, receipt } = outcome else {
        panic!("draft was pending");
    };
    assert_eq!(idea, "Vitamin C serums");
    assert_eq!(receipt.message_ids, vec![501]);
    assert!(sent.0.lock().unwrap()[0].contains("Vitamin C serums"));

    assert!(store.load().await.unwrap().is_none());
    assert!(matches!(
        pipeline.publish(&publisher, true).await.unwrap(),
        PublishOutcome::NothingPending
    ));
    let history = store.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message_ids, vec![501]);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn generate_without_ideas_is_a_no_op() {
    let dir = unique_data_dir("no-ideas");
    let store = JsonFileStore::new(&dir);
    let selection = ProviderSelection::default();
    let providers = Providers {
        text: Arc::new(EchoText::default()),
        image: Arc::new(PlainImage::default()),
        face_swap: None,
    };

    let outcome = Pipeline::new(&store, &selection)
        .generate(&providers)
        .await
        .unwrap();
    assert!(matches!(outcome, GenerateOutcome::NoIdeas));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_publish_leaves_the_draft_pending() {
    let dir = unique_data_dir("rejected");
    let store = JsonFileStore::new(&dir);
    store.add("Peptides").await.unwrap();

    let selection = ProviderSelection {
        autopublish_enabled: true,
        ..ProviderSelection::default()
    };
    let providers = Providers {
        text: Arc::new(EchoText::default()),
        image: Arc::new(PlainImage::default()),
        face_swap: None,
    };
    let pipeline = Pipeline::new(&store, &selection);
    let GenerateOutcome::Drafted(draft) = pipeline.generate(&providers).await.unwrap() else {
        panic!("an idea was available");
    };

    let sent = Sent::default();
    let publisher = publisher_for(spawn_rejecting_telegram(sent.clone()).await);

    let err = pipeline.publish(&publisher, false).await.unwrap_err();
    match err {
        AutoposterError::Publish(PublishError::Rejected {
            code, description, ..
        }) => {
            assert_eq!(code, Some(400));
            assert!(description.contains("chat not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sent.0.lock().unwrap().len(), 1, "no retry after a rejection");

    assert_eq!(store.load().await.unwrap(), Some(draft), "draft stays pending");
    assert!(store.history().await.unwrap().is_empty());
    assert!(!dir.join("history.json").exists());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

/// Everything in memory; stands in for any non-file backend.
#[derive(Default)]
struct MemoryStore {
    ideas: Mutex<Vec<Idea>>,
    pending: Mutex<Option<Draft>>,
    history: Mutex<Vec<HistoryEntry>>,
    prompts: Mutex<PromptOverrides>,
    context: Mutex<Option<ContextDocument>>,
    face: Mutex<Option<ExpertFace>>,
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn save(&self, draft: &Draft) -> Result<(), StoreError> {
        *self.pending.lock().unwrap() = Some(draft.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Draft>, StoreError> {
        Ok(self.pending.lock().unwrap().clone().filter(Draft::is_pending))
    }

    async fn archive(&self, draft: &Draft) -> Result<(), StoreError> {
        let mut record = draft.clone();
        record.status = DraftStatus::Published;
        self.history.lock().unwrap().push(HistoryEntry::from(&record));
        *self.pending.lock().unwrap() = Some(record);
        Ok(())
    }
}

#[async_trait]
impl IdeaPool for MemoryStore {
    async fn next_unused(&self) -> Result<Option<Idea>, StoreError> {
        Ok(self.ideas.lock().unwrap().iter().find(|i| !i.used).cloned())
    }

    async fn mark_used(&self, id: u64) -> Result<(), StoreError> {
        let mut ideas = self.ideas.lock().unwrap();
        let idea = ideas
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::IdeaNotFound(id))?;
        idea.used = true;
        Ok(())
    }

    async fn add(&self, text: &str) -> Result<Idea, StoreError> {
        let mut ideas = self.ideas.lock().unwrap();
        let idea = Idea {
            id: ideas.len() as u64 + 1,
            idea: text.to_string(),
            used: false,
        };
        ideas.push(idea.clone());
        Ok(idea)
    }

    async fn list(&self) -> Result<Vec<Idea>, StoreError> {
        Ok(self.ideas.lock().unwrap().clone())
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn prompts(&self) -> Result<PromptOverrides, StoreError> {
        Ok(self.prompts.lock().unwrap().clone())
    }

    async fn set_prompts(&self, prompts: &PromptOverrides) -> Result<(), StoreError> {
        *self.prompts.lock().unwrap() = prompts.clone();
        Ok(())
    }

    async fn context(&self) -> Result<Option<ContextDocument>, StoreError> {
        Ok(self.context.lock().unwrap().clone())
    }

    async fn set_context(&self, doc: &ContextDocument) -> Result<(), StoreError> {
        *self.context.lock().unwrap() = Some(doc.clone());
        Ok(())
    }

    async fn clear_context(&self) -> Result<(), StoreError> {
        *self.context.lock().unwrap() = None;
        Ok(())
    }

    async fn expert_face(&self) -> Result<Option<ExpertFace>, StoreError> {
        Ok(self.face.lock().unwrap().clone())
    }

    async fn set_expert_face(&self, face: &ExpertFace) -> Result<(), StoreError> {
        *self.face.lock().unwrap() = Some(face.clone());
        Ok(())
    }
}

#[tokio::test]
async fn phases_run_against_any_store() {
    let store = MemoryStore::default();
    store.add("Sunscreen in winter").await.unwrap();
    store
        .set_context(&ContextDocument::new("notes.txt", "SPF 30 minimum"))
        .await
        .unwrap();

    let selection = ProviderSelection::default();
    let text = Arc::new(EchoText::default());
    let providers = Providers {
        text: text.clone(),
        image: Arc::new(PlainImage::default()),
        face_swap: None,
    };
    let pipeline = Pipeline::new(&store, &selection);

    let GenerateOutcome::Drafted(draft) = pipeline.generate(&providers).await.unwrap() else {
        panic!("an idea was available");
    };
    assert_eq!(draft.face, FaceOutcome::NotRequested);
    assert!(text.seen.lock().unwrap()[0].0.contains("SPF 30 minimum"));
    assert!(store.next_unused().await.unwrap().is_none());

    let sent = Sent::default();
    let publisher = publisher_for(spawn_telegram(sent.clone()).await);
    let outcome = pipeline.publish(&publisher, true).await.unwrap();
    assert!(matches!(outcome, PublishOutcome::Published { .. }));

    assert!(store.load().await.unwrap().is_none());
    let history = store.history.lock().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].image, draft.image);
    assert_eq!(history[0].message_ids, vec![501]);
}
