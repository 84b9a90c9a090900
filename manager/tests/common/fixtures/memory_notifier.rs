//! Notifier that keeps every sent and edited message in memory

use async_trait::async_trait;
use power_manager::errors::NotificationError;
use power_manager::notify::{MessageRef, Notifier, OutgoingMessage};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use super::test_data::ALLOWED_CHAT;

#[derive(Debug, Clone)]
pub struct EditedMessage {
    pub target: MessageRef,
    pub message: OutgoingMessage,
}

#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<OutgoingMessage>>,
    edits: Mutex<Vec<EditedMessage>>,
    next_id: AtomicI64,
    fail_sends: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn edits(&self) -> Vec<EditedMessage> {
        self.edits.lock().unwrap().clone()
    }

    pub fn edited_texts(&self) -> Vec<String> {
        self.edits().into_iter().map(|e| e.message.text).collect()
    }

    /// Sent messages that carry holiday confirmation buttons
    pub fn prompts(&self) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.tokens().iter().any(|t| t.starts_with("holiday_")))
            .collect()
    }

    pub fn any_text_contains(&self, needle: &str) -> bool {
        self.sent_texts()
            .iter()
            .chain(self.edited_texts().iter())
            .any(|t| t.contains(needle))
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
        self.edits.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, NotificationError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NotificationError::RequestFailed {
                method: "sendMessage".to_string(),
                reason: "chat unreachable".to_string(),
            });
        }

        self.sent.lock().unwrap().push(message);
        Ok(MessageRef {
            chat_id: ALLOWED_CHAT,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }

    async fn edit(
        &self,
        target: &MessageRef,
        message: OutgoingMessage,
    ) -> Result<(), NotificationError> {
        self.edits.lock().unwrap().push(EditedMessage {
            target: *target,
            message,
        });
        Ok(())
    }
}
