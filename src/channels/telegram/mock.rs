//! In-process fake of the Bot API for tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, http::Uri, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::TelegramConfig;

pub const TEST_TOKEN: &str = "123456:test-token";

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<(String, Value)>>,
    updates: Mutex<Vec<Value>>,
    failing: Mutex<HashSet<String>>,
}

pub struct MockBotApi {
    base_url: String,
    state: Arc<MockState>,
}

impl MockBotApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self, chat_id: &str) -> TelegramConfig {
        TelegramConfig::new(TEST_TOKEN, chat_id)
            .with_api_base_url(self.base_url.clone())
            .with_poll_timeout(Duration::from_secs(1))
    }

    pub fn push_update(&self, update: Value) {
        self.state.updates.lock().push(update);
    }

    pub fn fail_method(&self, method: &str) {
        self.state.failing.lock().insert(method.to_string());
    }

    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Poll until `method` has been called `count` times.
    pub async fn wait_for_calls(&self, method: &str, count: usize) -> Vec<Value> {
        for _ in 0..200 {
            let calls = self.calls(method);
            if calls.len() >= count {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {} call(s) to {}", count, method);
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let path = uri.path();
    let expected_prefix = format!("/bot{}/", TEST_TOKEN);
    let Some(method) = path.strip_prefix(&expected_prefix).map(str::to_string) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    };

    state.calls.lock().push((method.clone(), body.clone()));

    if state.failing.lock().contains(&method) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
        );
    }

    let result = match method.as_str() {
        "sendMessage" => json!({
            "message_id": 1,
            "date": 0,
            "chat": {"id": body["chat_id"].as_str().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0), "type": "private"},
            "text": body["text"],
        }),
        "editMessageText" => json!({
            "message_id": body["message_id"],
            "date": 0,
            "chat": {"id": body["chat_id"], "type": "private"},
            "text": body["text"],
        }),
        "answerCallbackQuery" => json!(true),
        "getUpdates" => {
            let offset = body["offset"].as_i64().unwrap_or(0);
            let pending: Vec<Value> = state
                .updates
                .lock()
                .iter()
                .filter(|u| u["update_id"].as_i64().unwrap_or(0) >= offset)
                .cloned()
                .collect();
            if pending.is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Value::Array(pending)
        }
        _ => Value::Null,
    };

    (StatusCode::OK, Json(json!({"ok": true, "result": result})))
}
