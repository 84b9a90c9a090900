use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use super::{reasons, CheckAction, CheckOutcome, Clock, ConfirmationToken, StopOutcome};
use crate::calendar::{is_weekend, CalendarProvider, DayInfo, UpcomingHoliday};
use crate::config::ConfirmationConfig;
use crate::constants::timing;
use crate::notify::{messages, MessageRef, Notifier, OutgoingMessage};
use crate::power::PowerSequencer;
use crate::store::{Decision, DecisionStore, HolidayDecision, RecordOutcome, Schedule, ScheduleStore};

/// Snapshot of today's classification for status views
#[derive(Debug, Clone, Serialize)]
pub struct TodayOverview {
    pub date: NaiveDate,
    pub now: DateTime<Tz>,
    pub day: DayInfo,
    pub decision: Option<HolidayDecision>,
    pub awaiting_confirmation: bool,
    pub schedule: Schedule,
}

/// How a resident start-check finished waiting for an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWait {
    /// An answer appeared in the store (from any process)
    Decided(Decision),
    /// Deadline hit and the configured default was applied
    Expired(CheckOutcome),
    /// Deadline hit with no default configured
    DeadlinePassed,
}

pub struct DecisionEngine {
    clock: Arc<dyn Clock>,
    calendar: CalendarProvider,
    schedule: Arc<ScheduleStore>,
    decisions: Arc<DecisionStore>,
    sequencer: Arc<PowerSequencer>,
    notifier: Arc<dyn Notifier>,
    // Prompts sent by this process and not yet answered
    pending: Mutex<HashMap<NaiveDate, MessageRef>>,
}

impl DecisionEngine {
    pub fn new(
        clock: Arc<dyn Clock>,
        calendar: CalendarProvider,
        schedule: Arc<ScheduleStore>,
        decisions: Arc<DecisionStore>,
        sequencer: Arc<PowerSequencer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            clock,
            calendar,
            schedule,
            decisions,
            sequencer,
            notifier,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn schedule_store(&self) -> &Arc<ScheduleStore> {
        &self.schedule
    }

    pub fn decision_store(&self) -> &Arc<DecisionStore> {
        &self.decisions
    }

    pub fn sequencer(&self) -> &Arc<PowerSequencer> {
        &self.sequencer
    }

    /// Working day a start-check applies to. A trigger fired before
    /// midnight because of the lead time targets the next day.
    pub async fn check_date(&self) -> NaiveDate {
        let now = self.clock.now();
        let today = now.date_naive();
        let schedule = self.schedule.current().await;

        let minutes_now = i64::from(now.hour()) * 60 + i64::from(now.minute());
        let until_next_start = 24 * 60 - minutes_now + i64::from(schedule.start_hour) * 60;
        if now.hour() >= schedule.end_hour && until_next_start <= i64::from(schedule.lead_minutes) {
            if let Some(tomorrow) = today.succ_opt() {
                debug!("Early start-check at {}, deciding for {}", now, tomorrow);
                return tomorrow;
            }
        }
        today
    }

    /// Morning check: decide whether the server should run on the coming
    /// working day
    #[instrument(skip(self))]
    pub async fn decide_for_today(&self) -> CheckOutcome {
        let date = self.check_date().await;
        self.decide_for(date).await
    }

    pub async fn decide_for(&self, today: NaiveDate) -> CheckOutcome {

        // Weekend wins over everything, including the schedule
        if is_weekend(today) {
            info!("{} is a weekend day, skipping", today);
            return CheckOutcome::skip(reasons::WEEKEND);
        }

        let schedule = self.schedule.current().await;
        let day = self.calendar.day_info(today, &schedule);

        if !day.is_scheduled_workday {
            info!("{} is not a scheduled working day, skipping", today);
            return CheckOutcome::skip(reasons::NOT_WORKING_DAY);
        }

        if day.needs_confirmation {
            let holiday_name = day.holiday_name.as_deref().unwrap_or("public holiday");
            return match self.decisions.get(today).await {
                Some(stored) if stored.decision == Decision::Run => {
                    info!("{} ({}): stored decision is run", today, holiday_name);
                    self.sequencer.ensure_started().await
                }
                Some(_) => {
                    info!("{} ({}): stored decision is skip", today, holiday_name);
                    CheckOutcome::skip(reasons::USER_DECLINED_HOLIDAY)
                }
                None => self.request_confirmation(today, holiday_name).await,
            };
        }

        self.sequencer.ensure_started().await
    }

    async fn request_confirmation(&self, date: NaiveDate, holiday_name: &str) -> CheckOutcome {
        let mut pending = self.pending.lock().await;

        if pending.contains_key(&date) {
            debug!("Prompt for {} already sent, not repeating it", date);
        } else {
            match self
                .notifier
                .send(messages::holiday_prompt(date, holiday_name))
                .await
            {
                Ok(sent) => {
                    info!("Holiday prompt sent for {} ({})", date, holiday_name);
                    pending.insert(date, sent);
                }
                Err(e) => {
                    error!("✗ Could not send holiday prompt for {}: {}", date, e);
                    return CheckOutcome::error(e.to_string());
                }
            }
        }

        CheckOutcome::new(
            CheckAction::WaitingConfirmation,
            reasons::HOLIDAY_CONFIRMATION_NEEDED,
        )
    }

    /// Evening check: shut down once the working day is over
    #[instrument(skip(self))]
    pub async fn decide_stop(&self) -> StopOutcome {
        let now = self.clock.now();
        let schedule = self.schedule.current().await;

        if now.hour() < schedule.end_hour {
            info!(
                "Stop check at {:02}:{:02} is before end hour {}, nothing to do",
                now.hour(),
                now.minute(),
                schedule.end_hour
            );
            return StopOutcome::NotDue;
        }

        self.sequencer.ensure_stopped().await
    }

    /// Apply an answer from a prompt button. The first answer for a date
    /// wins; later ones act on the stored value.
    #[instrument(skip(self, prompt), fields(date = %token.date))]
    pub async fn handle_confirmation(
        &self,
        token: ConfirmationToken,
        prompt: Option<&MessageRef>,
    ) -> CheckOutcome {
        let recorded = match self.decisions.record(token.date, token.decision).await {
            Ok(recorded) => recorded,
            Err(e) => {
                error!("✗ Failed to persist decision: {}", e);
                let text = messages::decision_not_saved(token.date, &e.to_string());
                if let Err(e) = self.notifier.send(OutgoingMessage::text(text)).await {
                    warn!("Notification failed: {}", e);
                }
                return CheckOutcome::error(e.to_string());
            }
        };

        let sent_prompt = self.pending.lock().await.remove(&token.date);
        let decision = recorded.decision();
        let already_decided = matches!(recorded, RecordOutcome::AlreadyDecided(_));

        if let Some(target) = prompt.copied().or(sent_prompt) {
            let text = messages::confirmation_resolved(token.date, decision, already_decided);
            if let Err(e) = self.notifier.edit(&target, OutgoingMessage::text(text)).await {
                warn!("Failed to update prompt message: {}", e);
            }
        }

        self.act_on_decision(token.date, decision).await
    }

    async fn act_on_decision(&self, date: NaiveDate, decision: Decision) -> CheckOutcome {
        let current = self.check_date().await;
        match decision {
            Decision::Skip => CheckOutcome::skip(reasons::USER_DECLINED_HOLIDAY),
            Decision::Run if date != self.clock.today() && date != current => {
                info!("Run answer for {} is not for today, not starting", date);
                if let Err(e) = self
                    .notifier
                    .send(OutgoingMessage::text(messages::stale_confirmation(date)))
                    .await
                {
                    warn!("Notification failed: {}", e);
                }
                CheckOutcome::skip(reasons::STALE_CONFIRMATION)
            }
            Decision::Run => self.sequencer.ensure_started().await,
        }
    }

    /// Deadline for an unanswered prompt: the configured expiry, otherwise
    /// the end of the working day being checked
    pub async fn resolution_deadline(&self, confirmation: &ConfirmationConfig) -> DateTime<Tz> {
        let now = self.clock.now();
        if let Some(minutes) = confirmation.expire_after_minutes {
            return now + ChronoDuration::minutes(minutes as i64);
        }

        let schedule = self.schedule.current().await;
        let end_of_day = self
            .check_date()
            .await
            .and_hms_opt(schedule.end_hour, 0, 0)
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest());
        end_of_day.unwrap_or(now)
    }

    /// Block until `date` has a stored answer or `deadline` passes. Answers
    /// may come from this process's listener or from another process.
    pub async fn await_resolution(
        &self,
        date: NaiveDate,
        deadline: DateTime<Tz>,
        on_expiry: Option<Decision>,
    ) -> ResolutionWait {
        info!("Waiting for a decision on {} until {}", date, deadline);

        loop {
            if let Some(stored) = self.decisions.get(date).await {
                info!("Decision for {} found: {}", date, stored.decision.as_str());
                return ResolutionWait::Decided(stored.decision);
            }

            if self.clock.now() >= deadline {
                return match on_expiry {
                    Some(decision) => {
                        warn!(
                            "No answer for {} by {}, applying default '{}'",
                            date,
                            deadline,
                            decision.as_str()
                        );
                        if let Err(e) = self
                            .notifier
                            .send(OutgoingMessage::text(messages::confirmation_expired(
                                date, decision,
                            )))
                            .await
                        {
                            warn!("Notification failed: {}", e);
                        }
                        let outcome = self
                            .handle_confirmation(ConfirmationToken::new(date, decision), None)
                            .await;
                        ResolutionWait::Expired(outcome)
                    }
                    None => {
                        warn!("No answer for {} by {}, giving up", date, deadline);
                        self.pending.lock().await.remove(&date);
                        ResolutionWait::DeadlinePassed
                    }
                };
            }

            sleep(timing::DECISION_RECHECK_INTERVAL).await;
        }
    }

    pub async fn today_overview(&self) -> TodayOverview {
        let now = self.clock.now();
        let date = now.date_naive();
        let schedule = self.schedule.current().await;
        let day = self.calendar.day_info(date, &schedule);
        let decision = self.decisions.get(date).await;
        let awaiting_confirmation =
            day.needs_confirmation && decision.is_none() && self.pending.lock().await.contains_key(&date);

        TodayOverview {
            date,
            now,
            day,
            decision,
            awaiting_confirmation,
            schedule,
        }
    }

    pub fn upcoming_holidays(&self, window_days: u32) -> Vec<UpcomingHoliday> {
        self.calendar.upcoming(self.clock.today(), window_days)
    }
}
