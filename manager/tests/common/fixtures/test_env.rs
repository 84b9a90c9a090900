//! Fully wired engine over in-memory seams and a temp data directory

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use power_manager::bot::{BotHandler, ChatListener};
use power_manager::calendar::{CalendarProvider, RussianCalendar};
use power_manager::config::SequencerTimings;
use power_manager::engine::DecisionEngine;
use power_manager::notify::TelegramClient;
use power_manager::operation_tracker::PowerOperationTracker;
use power_manager::power::PowerSequencer;
use power_manager::store::{DecisionStore, ScheduleStore, DECISIONS_FILE, SCHEDULE_FILE};
use power_manager::web::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use super::mock_telegram::BOT_TOKEN;
use super::test_data::{at, ALLOWED_CHAT};
use super::{MemoryNotifier, MockPower, RecordingSession, RecordingTrigger, TestClock};

/// Long-poll timeout the test listener asks for; acknowledgements use 0
pub const LISTENER_POLL_SECONDS: u64 = 25;

/// Short delays for tests that run on real time
pub fn fast_timings() -> SequencerTimings {
    SequencerTimings {
        boot_wait: Duration::from_millis(20),
        session_settle: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_millis(100),
    }
}

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub clock: Arc<TestClock>,
    pub power: Arc<MockPower>,
    pub notifier: Arc<MemoryNotifier>,
    pub session: Arc<RecordingSession>,
    pub trigger: Arc<RecordingTrigger>,
    pub tracker: PowerOperationTracker,
    pub engine: Arc<DecisionEngine>,
}

pub struct TestEnvBuilder {
    now: DateTime<Tz>,
    power: MockPower,
    session: RecordingSession,
    timings: SequencerTimings,
}

impl TestEnv {
    /// Server off, clock at `hour:minute` on `day`
    pub fn at(day: NaiveDate, hour: u32, minute: u32) -> TestEnvBuilder {
        TestEnvBuilder {
            now: at(day, hour, minute),
            power: MockPower::off(),
            session: RecordingSession::new(),
            timings: fast_timings(),
        }
    }

    pub fn data_path(&self, file: &str) -> PathBuf {
        self.temp_dir.path().join("data").join(file)
    }

    /// A second engine over the same files, as a separate process would see them
    pub fn second_process(&self, notifier: Arc<MemoryNotifier>) -> Arc<DecisionEngine> {
        let schedule = Arc::new(ScheduleStore::new(
            self.data_path(SCHEDULE_FILE),
            Arc::new(RecordingTrigger::new()),
        ));
        let decisions = Arc::new(DecisionStore::new(self.data_path(DECISIONS_FILE)));
        let sequencer = Arc::new(PowerSequencer::new(
            self.power.clone(),
            notifier.clone(),
            Arc::new(RecordingSession::new()),
            *self.engine.sequencer().timings(),
        ));

        Arc::new(DecisionEngine::new(
            self.clock.clone(),
            CalendarProvider::new(Arc::new(RussianCalendar::new())),
            schedule,
            decisions,
            sequencer,
            notifier,
        ))
    }

    pub fn bot_handler(&self) -> BotHandler {
        BotHandler::new(
            self.engine.clone(),
            self.notifier.clone(),
            self.tracker.clone(),
            ALLOWED_CHAT,
        )
    }

    /// Listener polling the mock Bot API at `base_url`; replies still go
    /// through the in-memory notifier
    pub fn chat_listener(&self, base_url: &str) -> ChatListener {
        let telegram = Arc::new(TelegramClient::new(base_url, BOT_TOKEN, ALLOWED_CHAT).unwrap());
        ChatListener::new(telegram, Arc::new(self.bot_handler()), LISTENER_POLL_SECONDS)
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.engine.clone(), self.tracker.clone())
    }
}

impl TestEnvBuilder {
    pub fn server_on(self) -> Self {
        Self {
            power: MockPower::on(),
            ..self
        }
    }

    pub fn failing_session(self) -> Self {
        Self {
            session: RecordingSession::failing(),
            ..self
        }
    }

    pub fn timings(self, timings: SequencerTimings) -> Self {
        Self { timings, ..self }
    }

    pub fn build(self) -> TestEnv {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");

        let clock = Arc::new(TestClock::new(self.now));
        let power = Arc::new(self.power);
        let notifier = Arc::new(MemoryNotifier::new());
        let session = Arc::new(self.session);
        let trigger = Arc::new(RecordingTrigger::new());

        let schedule = Arc::new(ScheduleStore::new(
            data_dir.join(SCHEDULE_FILE),
            trigger.clone(),
        ));
        let decisions = Arc::new(DecisionStore::new(data_dir.join(DECISIONS_FILE)));
        let sequencer = Arc::new(PowerSequencer::new(
            power.clone(),
            notifier.clone(),
            session.clone(),
            self.timings,
        ));

        let engine = Arc::new(DecisionEngine::new(
            clock.clone(),
            CalendarProvider::new(Arc::new(RussianCalendar::new())),
            schedule,
            decisions,
            sequencer,
            notifier.clone(),
        ));

        TestEnv {
            temp_dir,
            clock,
            power,
            notifier,
            session,
            trigger,
            tracker: PowerOperationTracker::new(),
            engine,
        }
    }
}
