//! Application-wide constants for timeouts, waits and trigger layout
//!
//! Central repository for timing values and limits. Anything here that an
//! operator may want to change is also exposed as an optional override in
//! `config/main.toml`; these are the defaults.

use std::time::Duration;

/// Power-on sequencing constants
pub mod timing {
    use super::Duration;

    /// Fixed wait after a power-on request while the guest OS boots
    pub const BOOT_WAIT: Duration = Duration::from_secs(60);

    /// Fixed wait after launching the remote session before reporting ready
    pub const SESSION_SETTLE: Duration = Duration::from_secs(15);

    /// Interval between status polls during an interactive power toggle
    pub const INTERACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(10);

    /// Upper bound for an interactive power toggle to reach its target state
    pub const INTERACTIVE_POLL_TIMEOUT: Duration = Duration::from_secs(300);

    /// How often a resident start-check re-reads the decision store
    pub const DECISION_RECHECK_INTERVAL: Duration = Duration::from_secs(5);
}

/// HTTP client constants
pub mod http {
    use super::Duration;

    /// Timeout for requests to the cloud power API
    pub const CLOUD_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default base URL of the cloud power API
    pub const CLOUD_API_BASE: &str = "https://api.1cloud.ru";

    /// Default base URL of the Telegram Bot API
    pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
}

/// Chat listener constants
pub mod telegram {
    /// Long-poll timeout passed to getUpdates (seconds)
    pub const LONG_POLL_TIMEOUT_SECONDS: u64 = 30;

    /// Extra slack on top of the long-poll timeout for the HTTP request itself
    pub const LONG_POLL_SLACK_SECONDS: u64 = 10;

    /// Back-off after a failed getUpdates call (seconds)
    pub const ERROR_BACKOFF_SECONDS: u64 = 5;

    /// Per-request timeout for ordinary Bot API calls (seconds)
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
}

/// Trigger plan constants
pub mod trigger {
    /// Minute past `end_hour` at which the stop-check fires
    pub const STOP_CHECK_MINUTE: u32 = 5;

    /// Marker appended to every crontab line owned by this tool
    pub const CRONTAB_MARKER: &str = "# power-manager";

    /// Upper bound for the start lead time (minutes)
    pub const MAX_LEAD_MINUTES: u32 = 720;
}

/// Calendar constants
pub mod calendar {
    /// Window used by the holidays listing (about two months)
    pub const UPCOMING_WINDOW_DAYS: u32 = 62;

    /// Holidays shown per month in the compact button view
    pub const MAX_HOLIDAYS_PER_MONTH: usize = 8;
}

/// Cleanup constants
pub mod cleanup {
    /// Hours after which a stuck manual power operation is released
    pub const OPERATION_CLEANUP_HOURS: i64 = 1;

    /// Cleanup interval in seconds
    pub const CLEANUP_INTERVAL_SECONDS: u64 = 600;
}

/// Default configuration values
pub mod defaults {
    /// Business timezone used for every day-boundary decision
    pub const TIMEZONE: &str = "Europe/Moscow";

    /// Directory holding the schedule and decision files
    pub const DATA_DIR: &str = "data";

    /// Working weekdays (0=Sun..6=Sat)
    pub const WORK_DAYS: [u8; 5] = [1, 2, 3, 4, 5];

    /// Working hours
    pub const START_HOUR: u32 = 8;
    pub const END_HOUR: u32 = 18;

    /// Minutes before `start_hour` at which the server is started
    pub const LEAD_MINUTES: u32 = 5;

    /// HTTP API bind address
    pub const WEB_HOST: &str = "127.0.0.1";
    pub const WEB_PORT: u16 = 8095;
}
