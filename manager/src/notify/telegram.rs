use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::{MessageRef, Notifier, OutgoingMessage};
use crate::constants::telegram;
use crate::errors::NotificationError;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Name recorded as `updated_by` on schedule changes
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
    chat: Chat,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotCommandInfo {
    pub command: String,
    pub description: String,
}

/// Telegram Bot API client bound to the one chat the bot serves
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    chat_id: i64,
}

impl TelegramClient {
    pub fn new(api_base: &str, bot_token: &str, chat_id: i64) -> Result<Self> {
        // Per-request timeouts; long polls need more than ordinary calls
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client for the Bot API")?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
            chat_id,
        })
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<T, NotificationError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotificationError::RequestFailed {
                method: method.to_string(),
                reason: e.without_url().to_string(),
            })?;

        let body: BotApiResponse<T> =
            response
                .json()
                .await
                .map_err(|e| NotificationError::RequestFailed {
                    method: method.to_string(),
                    reason: e.without_url().to_string(),
                })?;

        if !body.ok {
            return Err(NotificationError::ApiError {
                method: method.to_string(),
                description: body
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        body.result.ok_or_else(|| NotificationError::ApiError {
            method: method.to_string(),
            description: "response without result".to_string(),
        })
    }

    fn request_timeout() -> Duration {
        Duration::from_secs(telegram::REQUEST_TIMEOUT_SECONDS)
    }

    fn reply_markup(message: &OutgoingMessage) -> Value {
        let keyboard: Vec<Vec<Value>> = message
            .buttons
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| json!({ "text": b.label, "callback_data": b.token }))
                    .collect()
            })
            .collect();
        json!({ "inline_keyboard": keyboard })
    }

    /// Send to an arbitrary chat, used for access-denied replies
    pub async fn send_to(
        &self,
        chat_id: i64,
        message: OutgoingMessage,
    ) -> Result<MessageRef, NotificationError> {
        let mut payload = json!({ "chat_id": chat_id, "text": message.text });
        if !message.buttons.is_empty() {
            payload["reply_markup"] = Self::reply_markup(&message);
        }

        let sent: SentMessage = self
            .call("sendMessage", &payload, Self::request_timeout())
            .await?;
        Ok(MessageRef {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    pub async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), NotificationError> {
        let mut payload = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            payload["text"] = json!(text);
            payload["show_alert"] = json!(true);
        }
        self.call::<bool>("answerCallbackQuery", &payload, Self::request_timeout())
            .await
            .map(|_| ())
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_seconds: u64,
    ) -> Result<Vec<Update>, NotificationError> {
        let payload = json!({
            "offset": offset,
            "timeout": timeout_seconds,
            "allowed_updates": ["message", "callback_query"],
        });
        let timeout = Duration::from_secs(timeout_seconds + telegram::LONG_POLL_SLACK_SECONDS);
        self.call("getUpdates", &payload, timeout).await
    }

    pub async fn set_commands(&self, commands: &[BotCommandInfo]) -> Result<(), NotificationError> {
        let payload = json!({ "commands": commands });
        self.call::<bool>("setMyCommands", &payload, Self::request_timeout())
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, NotificationError> {
        debug!("Sending message to chat {}", self.chat_id);
        self.send_to(self.chat_id, message).await
    }

    async fn edit(
        &self,
        target: &MessageRef,
        message: OutgoingMessage,
    ) -> Result<(), NotificationError> {
        let mut payload = json!({
            "chat_id": target.chat_id,
            "message_id": target.message_id,
            "text": message.text,
        });
        if !message.buttons.is_empty() {
            payload["reply_markup"] = Self::reply_markup(&message);
        }

        match self
            .call::<Value>("editMessageText", &payload, Self::request_timeout())
            .await
        {
            Ok(_) => Ok(()),
            // Same text on a progress tick is not a failure
            Err(NotificationError::ApiError { description, .. })
                if description.contains("message is not modified") =>
            {
                debug!("Message {} unchanged", target.message_id);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to edit message {}: {}", target.message_id, e);
                Err(e)
            }
        }
    }
}
