use autoposter::config::{ProviderDefaults, TELEGRAM_CAPTION_LIMIT, TelegramConfig};
use autoposter::error::PublishError;
use autoposter::publish::{Publisher, TelegramChannel};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct CaptureState {
    reqs: Arc<Mutex<Vec<Captured>>>,
    reject: bool,
}

#[derive(Debug, Clone)]
struct Captured {
    method: &'static str,
    content_type: String,
    body: Vec<u8>,
}

impl Captured {
    fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

fn record(
    state: &CaptureState,
    method: &'static str,
    headers: &HeaderMap,
    body: &[u8],
) -> (StatusCode, Json<Value>) {
    let mut reqs = state.reqs.lock().unwrap();
    reqs.push(Captured {
        method,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        body: body.to_vec(),
    });

    if state.reject {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: can't parse entities"
            })),
        );
    }

    let message_id = 100 + reqs.len() as i64;
    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "result": { "message_id": message_id, "chat": { "id": -100123 } }
        })),
    )
}

async fn send_photo(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, "sendPhoto", &headers, &body)
}

async fn send_message(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, "sendMessage", &headers, &body)
}

async fn publisher(state: CaptureState) -> Publisher<TelegramChannel> {
    let app = Router::new()
        .route(&format!("/bot{TOKEN}/sendPhoto"), post(send_photo))
        .route(&format!("/bot{TOKEN}/sendMessage"), post(send_message))
        .with_state(state);
    let base = spawn_test_server(app).await;

    let cfg = TelegramConfig {
        bot_token: TOKEN.to_string(),
        channel_id: "-100123".to_string(),
        api_url: base,
        ..TelegramConfig::default()
    };
    let channel =
        TelegramChannel::new(&cfg, &ProviderDefaults::default()).expect("channel config");
    Publisher::new(channel, cfg.caption_limit)
}

#[tokio::test]
async fn short_text_goes_out_as_one_captioned_photo() {
    let state = CaptureState::default();
    let publisher = publisher(state.clone()).await;
    let text = "<b>Morning</b> routine";

    let receipt = publisher.publish(b"\xFF\xD8\xFFjpeg", text).await.unwrap();
    assert_eq!(receipt.message_ids, vec![101]);

    let reqs = state.reqs.lock().unwrap();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, "sendPhoto");
    assert!(reqs[0].content_type.starts_with("multipart/form-data"));
    let body = reqs[0].body_str();
    assert!(body.contains("name=\"caption\""));
    assert!(body.contains(text));
    assert!(body.contains("name=\"parse_mode\"\r\n\r\nHTML"));
    assert!(body.contains("name=\"chat_id\"\r\n\r\n-100123"));
    assert!(body.contains("filename=\"post.jpg\""));
}

#[tokio::test]
async fn long_text_is_sent_after_the_photo_unmodified() {
    let state = CaptureState::default();
    let publisher = publisher(state.clone()).await;
    let text = format!("<i>{}</i>", "ю".repeat(TELEGRAM_CAPTION_LIMIT));

    let receipt = publisher.publish(b"\xFF\xD8\xFFjpeg", &text).await.unwrap();
    assert_eq!(receipt.message_ids, vec![101, 102]);

    let reqs = state.reqs.lock().unwrap();
    let methods: Vec<_> = reqs.iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["sendPhoto", "sendMessage"]);
    assert!(!reqs[0].body_str().contains("name=\"caption\""));

    let message: Value = serde_json::from_slice(&reqs[1].body).unwrap();
    assert_eq!(message["text"], text.as_str());
    assert_eq!(message["chat_id"], "-100123");
    assert_eq!(message["parse_mode"], "HTML");
}

#[tokio::test]
async fn rejected_photo_surfaces_telegram_description() {
    let state = CaptureState {
        reject: true,
        ..CaptureState::default()
    };
    let publisher = publisher(state.clone()).await;

    let err = publisher.publish(b"jpeg", "hi").await.unwrap_err();
    match err {
        PublishError::Rejected {
            status,
            code,
            description,
        } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(code, Some(400));
            assert!(description.contains("can't parse entities"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.reqs.lock().unwrap().len(), 1);
}

#[test]
fn missing_token_is_a_config_error() {
    let cfg = TelegramConfig {
        channel_id: "@channel".to_string(),
        ..TelegramConfig::default()
    };
    assert!(TelegramChannel::new(&cfg, &ProviderDefaults::default()).is_err());
}
