// File: manager/src/config/mod.rs
pub mod manager;
pub mod secrets;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::calendar::HolidayKind;
use crate::constants::{defaults, http, telegram, timing};
use crate::errors::ConfigError;
use crate::store::Decision;

pub use manager::ConfigManager;
pub use secrets::SecretsLoader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    pub cloud: CloudConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default = "default_cloud_api_base")]
    pub api_base: String,
    pub server_id: String,
    pub request_timeout_seconds: Option<u64>,
    // Populated from secrets.toml or CLOUD_API_TOKEN
    #[serde(skip)]
    pub api_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// The only chat the bot talks to and accepts commands from
    pub allowed_chat_id: i64,
    pub poll_timeout_seconds: Option<u64>,
    // Populated from secrets.toml or TELEGRAM_BOT_TOKEN
    #[serde(skip)]
    pub bot_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequencerConfig {
    pub boot_wait_seconds: Option<u64>,
    pub session_settle_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub poll_timeout_seconds: Option<u64>,
    /// Shell command that opens the remote desktop session
    pub session_command: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Rewrite the user crontab; checks run as separate processes
    #[default]
    Crontab,
    /// Run checks from the long-lived listener process
    InProcess,
    /// Leave triggers to the operator
    Disabled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub mode: TriggerMode,
    /// Program crontab lines invoke; defaults to the running executable
    pub command: Option<String>,
    /// File that crontab lines append their output to
    pub log_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Unanswered prompts resolve after this many minutes
    pub expire_after_minutes: Option<u64>,
    /// Decision recorded when a prompt expires; none leaves it unanswered
    pub on_expiry: Option<Decision>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub extra_holidays: Vec<ExtraHoliday>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraHoliday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default = "default_extra_kind")]
    pub kind: HolidayKind,
}

/// Resolved sequencer delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTimings {
    pub boot_wait: Duration,
    pub session_settle: Duration,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl Default for SequencerTimings {
    fn default() -> Self {
        Self {
            boot_wait: timing::BOOT_WAIT,
            session_settle: timing::SESSION_SETTLE,
            poll_interval: timing::INTERACTIVE_POLL_INTERVAL,
            poll_timeout: timing::INTERACTIVE_POLL_TIMEOUT,
        }
    }
}

impl SequencerConfig {
    pub fn timings(&self) -> SequencerTimings {
        let defaults = SequencerTimings::default();
        SequencerTimings {
            boot_wait: self
                .boot_wait_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.boot_wait),
            session_settle: self
                .session_settle_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_settle),
            poll_interval: self
                .poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            poll_timeout: self
                .poll_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_timeout),
        }
    }
}

impl Config {
    /// Parsed business timezone
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "timezone".to_string(),
                reason: e.to_string(),
            })
    }

    pub fn data_path(&self, file_name: &str) -> PathBuf {
        PathBuf::from(&self.data_dir).join(file_name)
    }

    pub fn cloud_timeout(&self) -> Duration {
        self.cloud
            .request_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(http::CLOUD_REQUEST_TIMEOUT)
    }

    pub fn telegram_poll_timeout_seconds(&self) -> u64 {
        self.telegram
            .poll_timeout_seconds
            .unwrap_or(telegram::LONG_POLL_TIMEOUT_SECONDS)
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;

        if self.cloud.server_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "cloud.server_id".to_string(),
            });
        }

        let timings = self.sequencer.timings();
        if timings.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "sequencer.poll_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if timings.poll_timeout < timings.poll_interval {
            return Err(ConfigError::InvalidValue {
                field: "sequencer.poll_timeout_seconds".to_string(),
                reason: "must not be shorter than the poll interval".to_string(),
            });
        }

        if self.confirmation.on_expiry.is_some() && self.confirmation.expire_after_minutes.is_none()
        {
            return Err(ConfigError::InvalidValue {
                field: "confirmation.on_expiry".to_string(),
                reason: "requires confirmation.expire_after_minutes".to_string(),
            });
        }

        Ok(())
    }
}

fn default_timezone() -> String {
    defaults::TIMEZONE.to_string()
}

fn default_data_dir() -> String {
    defaults::DATA_DIR.to_string()
}

fn default_cloud_api_base() -> String {
    http::CLOUD_API_BASE.to_string()
}

fn default_telegram_api_base() -> String {
    http::TELEGRAM_API_BASE.to_string()
}

fn default_web_host() -> String {
    defaults::WEB_HOST.to_string()
}

fn default_web_port() -> u16 {
    defaults::WEB_PORT
}

fn default_extra_kind() -> HolidayKind {
    HolidayKind::Public
}
