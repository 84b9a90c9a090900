use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::commands::COMMAND_LIST;
use super::handlers::{BotHandler, HandleResult, Sender};
use crate::constants::telegram;
use crate::notify::telegram::{BotCommandInfo, CallbackQuery, IncomingMessage, Update};
use crate::notify::{MessageRef, OutgoingMessage, TelegramClient};

const ACCESS_DENIED: &str = "Access denied";

/// Long-polls the Bot API and feeds updates to the handler one at a time.
/// Shutdown is observed only between batches, so a running power sequence
/// always completes.
pub struct ChatListener {
    telegram: Arc<TelegramClient>,
    handler: Arc<BotHandler>,
    poll_timeout_seconds: u64,
}

impl ChatListener {
    pub fn new(telegram: Arc<TelegramClient>, handler: Arc<BotHandler>, poll_timeout_seconds: u64) -> Self {
        Self {
            telegram,
            handler,
            poll_timeout_seconds,
        }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.register_commands().await;
        info!("Chat listener started (long poll {}s)", self.poll_timeout_seconds);

        let mut offset: i64 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let batch = tokio::select! {
                result = self.telegram.get_updates(offset, self.poll_timeout_seconds) => result,
                _ = shutdown.changed() => break,
            };

            match batch {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update).await;
                    }
                }
                Err(e) => {
                    warn!("getUpdates failed: {}", e);
                    tokio::select! {
                        _ = sleep(Duration::from_secs(telegram::ERROR_BACKOFF_SECONDS)) => {}
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }

        self.acknowledge(offset).await;
        info!("Chat listener stopped");
        Ok(())
    }

    /// Telegram drops updates below the offset of the next `getUpdates`
    /// call. Without this the next process would replay the last batch.
    async fn acknowledge(&self, offset: i64) {
        if offset == 0 {
            return;
        }
        match self.telegram.get_updates(offset, 0).await {
            Ok(_) => debug!("Acknowledged updates below {}", offset),
            Err(e) => warn!("Failed to acknowledge updates below {}: {}", offset, e),
        }
    }

    async fn register_commands(&self) {
        let commands: Vec<BotCommandInfo> = COMMAND_LIST
            .iter()
            .map(|(command, description)| BotCommandInfo {
                command: command.to_string(),
                description: description.to_string(),
            })
            .collect();

        if let Err(e) = self.telegram.set_commands(&commands).await {
            warn!("Failed to register bot commands: {}", e);
        }
    }

    async fn dispatch(&self, update: Update) {
        debug!("Update {}", update.update_id);

        if let Some(query) = update.callback_query {
            self.dispatch_callback(query).await;
        } else if let Some(message) = update.message {
            self.dispatch_message(message).await;
        }
    }

    async fn dispatch_message(&self, message: IncomingMessage) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let sender = Sender {
            chat_id: message.chat.id,
            user: message
                .from
                .as_ref()
                .map(|u| u.display_name())
                .unwrap_or_else(|| message.chat.id.to_string()),
        };

        if self.handler.handle_message(&sender, text).await == HandleResult::Denied {
            if let Err(e) = self
                .telegram
                .send_to(sender.chat_id, OutgoingMessage::text(ACCESS_DENIED))
                .await
            {
                warn!("Failed to send access denial: {}", e);
            }
        }
    }

    async fn dispatch_callback(&self, query: CallbackQuery) {
        let Some(message) = query.message.as_ref() else {
            debug!("Callback {} without a message, ignoring", query.id);
            return;
        };
        let sender = Sender {
            chat_id: message.chat.id,
            user: query.from.display_name(),
        };
        let target = MessageRef {
            chat_id: message.chat.id,
            message_id: message.message_id,
        };

        // Answer first so the button spinner stops while long actions run
        let denial = (!self.handler.is_allowed(sender.chat_id)).then_some(ACCESS_DENIED);
        if let Err(e) = self.telegram.answer_callback(&query.id, denial).await {
            warn!("Failed to answer callback {}: {}", query.id, e);
        }

        let data = query.data.as_deref().unwrap_or_default();
        self.handler
            .handle_callback(&sender, data, Some(target))
            .await;
    }
}
