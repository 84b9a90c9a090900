//! Mock Telegram Bot API
//!
//! Answers every method with `{"ok": true, ...}` and lets tests inspect the
//! JSON payloads the client posted.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const BOT_TOKEN: &str = "123456:test-token";

pub struct MockTelegramApi {
    pub server: MockServer,
    pub base_url: String,
}

impl MockTelegramApi {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    fn method_path(name: &str) -> String {
        format!("/bot{}/{}", BOT_TOKEN, name)
    }

    pub async fn mock_send_message(&self, chat_id: i64, message_id: i64) {
        Mock::given(method("POST"))
            .and(path(Self::method_path("sendMessage")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {
                    "message_id": message_id,
                    "chat": { "id": chat_id, "type": "group" },
                    "date": 1_790_000_000,
                    "text": "ok"
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_edit_ok(&self) {
        Mock::given(method("POST"))
            .and(path(Self::method_path("editMessageText")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": true
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_error(&self, name: &str, description: &str) {
        Mock::given(method("POST"))
            .and(path(Self::method_path(name)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": description
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_updates(&self, updates: Value) {
        Mock::given(method("POST"))
            .and(path(Self::method_path("getUpdates")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": updates
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve `updates` to the first `getUpdates` call only
    pub async fn mock_updates_once(&self, updates: Value) {
        Mock::given(method("POST"))
            .and(path(Self::method_path("getUpdates")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": updates
            })))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Empty long-poll answer, delayed so an idle listener does not spin
    pub async fn mock_idle_updates(&self) {
        Mock::given(method("POST"))
            .and(path(Self::method_path("getUpdates")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true, "result": [] }))
                    .set_delay(Duration::from_millis(100)),
            )
            .with_priority(2)
            .mount(&self.server)
            .await;
    }

    /// JSON bodies posted to one Bot API method, in order
    pub async fn payloads(&self, name: &str) -> Vec<Value> {
        let wanted = Self::method_path(name);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == wanted)
            .filter_map(|r| r.body_json::<Value>().ok())
            .collect()
    }
}
