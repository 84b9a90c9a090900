//! Daily start/stop decisions
//!
//! The engine combines the calendar, the schedule and the stored holiday
//! answers into one action per check, and hands actual power work to the
//! `PowerSequencer`:
//!
//! ```text
//! weekend ──────────────────────────────► skip (weekend)
//! not a scheduled weekday ──────────────► skip (not_working_day)
//! public holiday on a scheduled weekday
//!     ├─ stored run ────────────────────► sequencer start
//!     ├─ stored skip ───────────────────► skip (user_declined_holiday)
//!     └─ no answer ─────────────────────► prompt, waiting_confirmation
//! ordinary workday ─────────────────────► sequencer start
//! ```

pub mod clock;
pub mod confirmation;
pub mod decision;

pub use clock::{Clock, SystemClock};
pub use confirmation::ConfirmationToken;
pub use decision::{DecisionEngine, ResolutionWait, TodayOverview};

use serde::Serialize;
use std::fmt;

/// Result reasons reported with every check
pub mod reasons {
    pub const WEEKEND: &str = "weekend";
    pub const NOT_WORKING_DAY: &str = "not_working_day";
    pub const USER_DECLINED_HOLIDAY: &str = "user_declined_holiday";
    pub const HOLIDAY_CONFIRMATION_NEEDED: &str = "holiday_confirmation_needed";
    pub const SERVER_ALREADY_ON: &str = "server_already_on";
    pub const SERVER_POWERED_ON_RDP_CONNECTED: &str = "server_powered_on_rdp_connected";
    pub const STALE_CONFIRMATION: &str = "stale_confirmation";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckAction {
    Skip,
    AlreadyRunning,
    Started,
    Error,
    WaitingConfirmation,
}

impl CheckAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckAction::Skip => "skip",
            CheckAction::AlreadyRunning => "already_running",
            CheckAction::Started => "started",
            CheckAction::Error => "error",
            CheckAction::WaitingConfirmation => "waiting_confirmation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub action: CheckAction,
    pub reason: String,
}

impl CheckOutcome {
    pub fn new(action: CheckAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }

    pub fn skip(reason: &str) -> Self {
        Self::new(CheckAction::Skip, reason)
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(CheckAction::Error, reason)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.action.as_str(), self.reason)
    }
}

/// Result of the end-of-day check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum StopOutcome {
    /// Current hour is before the end of the working day
    NotDue,
    AlreadyOff,
    Stopped,
    /// Status poll or power-off failed; carries the upstream message
    Failed(String),
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::NotDue => f.write_str("not_due"),
            StopOutcome::AlreadyOff => f.write_str("already_off"),
            StopOutcome::Stopped => f.write_str("stopped"),
            StopOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
