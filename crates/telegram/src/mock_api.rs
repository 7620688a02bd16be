//! In-process stand-in for the Telegram Bot API, for tests.
//!
//! Built for this crate's unit tests and, behind the `test-support` feature,
//! for downstream integration tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use {
    axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
    serde_json::{Value, json},
    tokio::sync::oneshot,
};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Bot API method as it appears in the path, e.g. `SendMessage`.
    pub method: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
pub struct MockTelegramApi {
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
    pub webhook_url: Arc<Mutex<String>>,
}

impl MockTelegramApi {
    pub fn with_webhook(url: &str) -> Self {
        let api = Self::default();
        *api.webhook_url.lock().expect("webhook lock") = url.to_string();
        api
    }

    pub fn calls(&self, method: &str) -> Vec<CapturedRequest> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Serve the mock on a random port and return a bot pointed at it.
    pub async fn spawn(&self) -> (teloxide::Bot, oneshot::Sender<()>) {
        let app = Router::new()
            .route("/{*path}", post(telegram_api_handler))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock telegram api");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        let api_url = url::Url::parse(&format!("http://{addr}/")).expect("parse api url");
        let bot = teloxide::Bot::new("test-token").set_api_url(api_url);
        (bot, shutdown_tx)
    }
}

/// Pull a text field out of a multipart body.
fn multipart_text_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"");
    let start = body.find(&marker)? + marker.len();
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value = &rest[value_start..];
    let end = value.find("\r\n").unwrap_or(value.len());
    Some(value[..end].trim_matches('"').to_string())
}

async fn telegram_api_handler(
    State(api): State<MockTelegramApi>,
    uri: Uri,
    body: Bytes,
) -> Json<Value> {
    let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&body).to_string();

    let result = match method.as_str() {
        "GetWebhookInfo" => {
            let url = api.webhook_url.lock().expect("webhook lock").clone();
            json!({
                "url": url,
                "has_custom_certificate": false,
                "pending_update_count": 0
            })
        },
        "SetWebhook" => {
            let url = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["url"].as_str().map(str::to_string))
                .or_else(|| multipart_text_field(&body, "url"))
                .or_else(|| {
                    let start = body.find("https://")?;
                    let rest = &body[start..];
                    let end = rest.find(['\r', '\n', '"']).unwrap_or(rest.len());
                    Some(rest[..end].to_string())
                })
                .unwrap_or_default();
            *api.webhook_url.lock().expect("webhook lock") = url;
            json!(true)
        },
        "SendMessage" | "SendAudio" | "SendPhoto" | "SendDocument" => json!({
            "message_id": 1,
            "date": 0,
            "chat": { "id": 42, "type": "private" },
            "text": "ok"
        }),
        _ => json!(true),
    };

    api.requests
        .lock()
        .expect("requests lock")
        .push(CapturedRequest { method, body });

    Json(json!({ "ok": true, "result": result }))
}
