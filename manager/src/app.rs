//! Process wiring and the three run modes
//!
//! A check invocation (`--check-start`, `--check-stop`) runs one decision and
//! exits; a start-check that ends in `waiting_confirmation` stays resident and
//! runs the chat listener until the day's answer is stored. Without a check
//! flag the process is the long-lived listener.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bot::{BotHandler, ChatListener};
use crate::calendar::{CalendarProvider, RussianCalendar};
use crate::config::{Config, ConfirmationConfig, TriggerMode};
use crate::constants::cleanup;
use crate::engine::{CheckAction, CheckOutcome, DecisionEngine, ResolutionWait, SystemClock};
use crate::notify::{Notifier, TelegramClient};
use crate::operation_tracker::PowerOperationTracker;
use crate::power::{CloudApiClient, PowerSequencer, ShellSessionLauncher};
use crate::scheduler::{CheckKind, CronJobTrigger, CrontabTrigger, DisabledTrigger, TriggerScheduler};
use crate::store::{DecisionStore, ScheduleStore, DECISIONS_FILE, SCHEDULE_FILE};
use crate::web::{start_web_server, AppState};

/// How the process was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    CheckStart,
    CheckStop,
    Listener,
}

pub struct App {
    config: Arc<Config>,
    engine: Arc<DecisionEngine>,
    telegram: Arc<TelegramClient>,
    tracker: PowerOperationTracker,
    jobs: Option<Arc<CronJobTrigger>>,
    checks: Option<mpsc::Receiver<CheckKind>>,
}

impl App {
    pub async fn build(config: Arc<Config>, config_dir: &str, mode: RunMode) -> Result<Self> {
        let timezone = config.tz()?;

        let telegram = Arc::new(TelegramClient::new(
            &config.telegram.api_base,
            &config.telegram.bot_token,
            config.telegram.allowed_chat_id,
        )?);
        let notifier: Arc<dyn Notifier> = telegram.clone();

        let power = Arc::new(CloudApiClient::new(
            &config.cloud.api_base,
            &config.cloud.server_id,
            &config.cloud.api_token,
            config.cloud_timeout(),
        )?);
        let session = Arc::new(ShellSessionLauncher::new(
            config.sequencer.session_command.clone(),
        ));
        let sequencer = Arc::new(PowerSequencer::new(
            power,
            notifier.clone(),
            session,
            config.sequencer.timings(),
        ));

        let mut jobs = None;
        let mut checks = None;
        let trigger: Arc<dyn TriggerScheduler> = match (config.trigger.mode, mode) {
            (TriggerMode::Crontab, _) => Arc::new(CrontabTrigger::new(
                crontab_command(&config, config_dir)?,
                config.trigger.log_path.clone(),
            )),
            (TriggerMode::InProcess, RunMode::Listener) => {
                let (sender, receiver) = mpsc::channel(8);
                let trigger = Arc::new(CronJobTrigger::new(timezone, sender).await?);
                jobs = Some(trigger.clone());
                checks = Some(receiver);
                trigger
            }
            // In-process jobs live in the listener; a check process leaves them alone
            (TriggerMode::InProcess, _) | (TriggerMode::Disabled, _) => Arc::new(DisabledTrigger),
        };

        let schedule = Arc::new(ScheduleStore::new(config.data_path(SCHEDULE_FILE), trigger));
        let decisions = Arc::new(DecisionStore::new(config.data_path(DECISIONS_FILE)));
        let calendar = CalendarProvider::new(Arc::new(RussianCalendar::with_extra_holidays(
            &config.calendar.extra_holidays,
        )));

        let engine = Arc::new(DecisionEngine::new(
            Arc::new(SystemClock::new(timezone)),
            calendar,
            schedule,
            decisions,
            sequencer,
            notifier,
        ));

        Ok(Self {
            config,
            engine,
            telegram,
            tracker: PowerOperationTracker::new(),
            jobs,
            checks,
        })
    }

    fn chat_listener(&self) -> ChatListener {
        let handler = Arc::new(BotHandler::new(
            self.engine.clone(),
            self.telegram.clone(),
            self.tracker.clone(),
            self.config.telegram.allowed_chat_id,
        ));
        ChatListener::new(
            self.telegram.clone(),
            handler,
            self.config.telegram_poll_timeout_seconds(),
        )
    }

    pub async fn run(self, mode: RunMode) -> Result<()> {
        match mode {
            RunMode::CheckStart => self.run_start_check().await,
            RunMode::CheckStop => self.run_stop_check().await,
            RunMode::Listener => self.run_listener().await,
        }
    }

    async fn run_start_check(self) -> Result<()> {
        let listener = self.chat_listener();
        let report = start_check(&self.engine, listener, &self.config.confirmation).await;
        info!("Start check result: {}", report.outcome);
        Ok(())
    }

    async fn run_stop_check(self) -> Result<()> {
        let outcome = self.engine.decide_stop().await;
        info!("Stop check result: {}", outcome);
        Ok(())
    }

    async fn run_listener(mut self) -> Result<()> {
        info!("Starting power manager listener");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        self.engine.schedule_store().republish_triggers().await;
        if let Some(jobs) = &self.jobs {
            jobs.start().await?;
        }

        // In-process triggers deliver check kinds here
        if let Some(mut checks) = self.checks.take() {
            let engine = self.engine.clone();
            tokio::spawn(async move {
                while let Some(kind) = checks.recv().await {
                    match kind {
                        CheckKind::Start => {
                            let outcome = engine.decide_for_today().await;
                            info!("Scheduled start check result: {}", outcome);
                        }
                        CheckKind::Stop => {
                            let outcome = engine.decide_stop().await;
                            info!("Scheduled stop check result: {}", outcome);
                        }
                    }
                }
            });
        }

        // Release manual operations that never finished
        let tracker = self.tracker.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(cleanup::CLEANUP_INTERVAL_SECONDS));
            loop {
                interval.tick().await;
                if tracker.cleanup_stale(cleanup::OPERATION_CLEANUP_HOURS).await {
                    warn!(
                        "Released a power operation stuck for over {} hours",
                        cleanup::OPERATION_CLEANUP_HOURS
                    );
                }
            }
        });

        let web_task = if self.config.web.enabled {
            let state = AppState::new(self.engine.clone(), self.tracker.clone());
            let web = self.config.web.clone();
            let shutdown = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                start_web_server(&web, state, shutdown).await
            }))
        } else {
            info!("HTTP API disabled");
            None
        };

        let listener = self.chat_listener();
        let listener_task = tokio::spawn(async move { listener.run(shutdown_rx).await });

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        info!("Shutdown requested");
        let _ = shutdown_tx.send(true);

        join_logged("chat listener", listener_task).await;
        if let Some(task) = web_task {
            join_logged("HTTP API", task).await;
        }

        info!("Power manager stopped");
        Ok(())
    }
}

/// Result of a start-check, with the wait for an answer when one was needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCheckReport {
    pub outcome: CheckOutcome,
    pub resolution: Option<ResolutionWait>,
}

/// Run the start-check. On `waiting_confirmation` the chat listener stays up
/// until the answer is stored (by this or another process) or the deadline
/// passes.
pub async fn start_check(
    engine: &DecisionEngine,
    listener: ChatListener,
    confirmation: &ConfirmationConfig,
) -> StartCheckReport {
    let outcome = engine.decide_for_today().await;
    if outcome.action != CheckAction::WaitingConfirmation {
        return StartCheckReport {
            outcome,
            resolution: None,
        };
    }

    let date = engine.check_date().await;
    let deadline = engine.resolution_deadline(confirmation).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener_task = tokio::spawn(async move { listener.run(shutdown_rx).await });

    let resolution = engine
        .await_resolution(date, deadline, confirmation.on_expiry)
        .await;

    let _ = shutdown_tx.send(true);
    join_logged("chat listener", listener_task).await;

    match &resolution {
        ResolutionWait::Decided(decision) => {
            info!("✓ Decision for {} resolved: {}", date, decision.as_str())
        }
        ResolutionWait::Expired(outcome) => {
            warn!("Confirmation for {} expired: {}", date, outcome)
        }
        ResolutionWait::DeadlinePassed => {
            warn!("✗ No decision for {} before {}", date, deadline)
        }
    }

    StartCheckReport {
        outcome,
        resolution: Some(resolution),
    }
}

async fn join_logged(name: &str, task: JoinHandle<Result<()>>) {
    match task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("{} failed: {:#}", name, e),
        Err(e) => error!("{} task panicked: {}", name, e),
    }
}

/// Shell prefix for crontab lines. Cron starts jobs in the home directory,
/// so the line changes into the current directory first.
fn crontab_command(config: &Config, config_dir: &str) -> Result<String> {
    if let Some(command) = &config.trigger.command {
        return Ok(command.clone());
    }

    let exe = std::env::current_exe().context("Failed to resolve the running executable")?;
    let cwd = std::env::current_dir().context("Failed to resolve the working directory")?;
    Ok(format!(
        "cd {} && {} --config {}",
        cwd.display(),
        exe.display(),
        config_dir
    ))
}
