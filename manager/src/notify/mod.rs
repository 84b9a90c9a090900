//! Operator notifications
//!
//! The core only needs two calls: send a message (optionally with buttons)
//! and edit a message it sent earlier. Every caller treats notification
//! failures as best-effort unless the message itself is the action, as with
//! a holiday prompt.

pub mod messages;
pub mod telegram;

pub use telegram::TelegramClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::NotificationError;

/// Inline button; `token` comes back verbatim in the callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Rows of inline buttons
    pub buttons: Vec<Vec<Button>>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        self.buttons.push(row);
        self
    }

    pub fn with_keyboard(mut self, keyboard: Vec<Vec<Button>>) -> Self {
        self.buttons.extend(keyboard);
        self
    }

    /// All button tokens, row by row
    pub fn tokens(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .flatten()
            .map(|b| b.token.as_str())
            .collect()
    }
}

/// Handle to a sent message, used for edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, NotificationError>;

    async fn edit(&self, target: &MessageRef, message: OutgoingMessage)
        -> Result<(), NotificationError>;
}
