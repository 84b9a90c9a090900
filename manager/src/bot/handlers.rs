use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::commands::{main_keyboard, parse_command, BotCommand, CallbackAction};
use super::render;
use crate::constants::calendar::UPCOMING_WINDOW_DAYS;
use crate::engine::DecisionEngine;
use crate::errors::ScheduleError;
use crate::notify::{MessageRef, Notifier, OutgoingMessage};
use crate::operation_tracker::PowerOperationTracker;
use crate::power::{PowerAction, ToggleOutcome};
use crate::store::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    Handled,
    /// Not a command or button this bot knows
    Ignored,
    /// Sent from a chat other than the configured one
    Denied,
}

/// Who sent an update and from where
#[derive(Debug, Clone)]
pub struct Sender {
    pub chat_id: i64,
    pub user: String,
}

/// Routes chat commands and button presses into the engine and sequencer.
/// Replies go through the `Notifier`, which only talks to the configured chat.
pub struct BotHandler {
    engine: Arc<DecisionEngine>,
    notifier: Arc<dyn Notifier>,
    tracker: PowerOperationTracker,
    allowed_chat_id: i64,
}

impl BotHandler {
    pub fn new(
        engine: Arc<DecisionEngine>,
        notifier: Arc<dyn Notifier>,
        tracker: PowerOperationTracker,
        allowed_chat_id: i64,
    ) -> Self {
        Self {
            engine,
            notifier,
            tracker,
            allowed_chat_id,
        }
    }

    pub fn is_allowed(&self, chat_id: i64) -> bool {
        chat_id == self.allowed_chat_id
    }

    async fn reply(&self, message: OutgoingMessage) {
        if let Err(e) = self.notifier.send(message).await {
            warn!("Failed to send reply: {}", e);
        }
    }

    async fn reply_or_edit(&self, target: Option<&MessageRef>, message: OutgoingMessage) {
        let result = match target {
            Some(target) => self.notifier.edit(target, message).await,
            None => self.notifier.send(message).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!("Failed to deliver reply: {}", e);
        }
    }

    #[instrument(skip(self, text), fields(chat = sender.chat_id))]
    pub async fn handle_message(&self, sender: &Sender, text: &str) -> HandleResult {
        let Some(parsed) = parse_command(text) else {
            return HandleResult::Ignored;
        };

        if !self.is_allowed(sender.chat_id) {
            warn!("Command from unauthorized chat {} ({})", sender.chat_id, sender.user);
            return HandleResult::Denied;
        }

        let command = match parsed {
            Ok(command) => command,
            Err(usage) => {
                self.reply(OutgoingMessage::text(usage)).await;
                return HandleResult::Handled;
            }
        };

        info!("Command {:?} from {}", command, sender.user);
        let schedule_store = self.engine.schedule_store();

        match command {
            BotCommand::Start => {
                let schedule = schedule_store.current().await;
                self.reply(
                    OutgoingMessage::text(render::welcome(&schedule)).with_keyboard(main_keyboard()),
                )
                .await;
            }
            BotCommand::Check => self.show_check(None).await,
            BotCommand::Schedule => {
                let schedule = schedule_store.current().await;
                self.reply(OutgoingMessage::text(render::schedule_view(&schedule)))
                    .await;
            }
            BotCommand::SetTime {
                start_hour,
                end_hour,
            } => {
                let result = schedule_store
                    .set_hours(start_hour, end_hour, Some(&sender.user))
                    .await;
                self.report_schedule_update(result).await;
            }
            BotCommand::SetDays(days) => {
                let result = schedule_store
                    .set_workdays(&days, Some(&sender.user))
                    .await;
                self.report_schedule_update(result).await;
            }
            BotCommand::Holidays => self.show_holidays(None).await,
        }

        HandleResult::Handled
    }

    async fn report_schedule_update(&self, result: Result<Schedule, ScheduleError>) {
        let text = match result {
            Ok(schedule) => render::schedule_updated(&schedule),
            Err(e) => {
                warn!("Schedule update rejected: {}", e);
                format!("Schedule not changed: {}", e)
            }
        };
        self.reply(OutgoingMessage::text(text)).await;
    }

    async fn show_check(&self, target: Option<&MessageRef>) {
        let overview = self.engine.today_overview().await;
        let status = self.engine.sequencer().status().await;
        let text = render::check_view(&overview, &status);
        self.reply_or_edit(target, OutgoingMessage::text(text).with_keyboard(main_keyboard()))
            .await;
    }

    async fn show_holidays(&self, target: Option<&MessageRef>) {
        let holidays = self.engine.upcoming_holidays(UPCOMING_WINDOW_DAYS);
        let text = render::holidays_view(&holidays);
        self.reply_or_edit(target, OutgoingMessage::text(text).with_keyboard(main_keyboard()))
            .await;
    }

    /// `message` is the message carrying the pressed button
    #[instrument(skip(self, message), fields(chat = sender.chat_id))]
    pub async fn handle_callback(
        &self,
        sender: &Sender,
        data: &str,
        message: Option<MessageRef>,
    ) -> HandleResult {
        if !self.is_allowed(sender.chat_id) {
            warn!("Button press from unauthorized chat {} ({})", sender.chat_id, sender.user);
            return HandleResult::Denied;
        }

        let Some(action) = CallbackAction::parse(data) else {
            warn!("Unknown callback data '{}'", data);
            return HandleResult::Ignored;
        };

        info!("Button {} from {}", action, sender.user);

        match action {
            CallbackAction::Power(power_action) => {
                self.run_power_action(power_action, sender, message).await
            }
            CallbackAction::Status => self.show_check(message.as_ref()).await,
            CallbackAction::Holidays => self.show_holidays(message.as_ref()).await,
            CallbackAction::Schedule => {
                let schedule = self.engine.schedule_store().current().await;
                let text = render::schedule_view(&schedule);
                self.reply_or_edit(
                    message.as_ref(),
                    OutgoingMessage::text(text).with_keyboard(main_keyboard()),
                )
                .await;
            }
            CallbackAction::Confirm(token) => {
                let outcome = self
                    .engine
                    .handle_confirmation(token, message.as_ref())
                    .await;
                info!("Holiday answer for {} handled: {}", token.date, outcome);
            }
        }

        HandleResult::Handled
    }

    async fn run_power_action(&self, action: PowerAction, sender: &Sender, message: Option<MessageRef>) {
        let operation = CallbackAction::Power(action).to_string();
        if let Err(e) = self
            .tracker
            .try_start(&operation, Some(sender.user.clone()))
            .await
        {
            self.reply(OutgoingMessage::text(e.to_string())).await;
            return;
        }

        let outcome = self.engine.sequencer().toggle(action, message).await;
        self.tracker.finish().await;

        match outcome {
            ToggleOutcome::Completed => info!("✓ {} completed", action),
            ToggleOutcome::TimedOut => warn!("{} timed out", action),
            ToggleOutcome::Failed(reason) => warn!("{} failed: {}", action, reason),
        }
    }
}
