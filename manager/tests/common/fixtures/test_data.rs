//! Common test data and constants

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

pub const TZ: Tz = chrono_tz::Europe::Moscow;

/// Chat the bot is configured for
pub const ALLOWED_CHAT: i64 = -100_200_300;
pub const OTHER_CHAT: i64 = 555_000;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wall-clock time in the business timezone
pub fn at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Tz> {
    TZ.from_local_datetime(&day.and_hms_opt(hour, minute, 0).unwrap())
        .single()
        .unwrap()
}

/// Dates used across tests (2026)
pub mod days {
    use super::date;
    use chrono::NaiveDate;

    pub fn ordinary_monday() -> NaiveDate {
        date(2026, 10, 12)
    }

    /// Wednesday, no holiday
    pub fn ordinary_wednesday() -> NaiveDate {
        date(2026, 10, 14)
    }

    pub fn ordinary_friday() -> NaiveDate {
        date(2026, 10, 16)
    }

    pub fn saturday() -> NaiveDate {
        date(2026, 10, 17)
    }

    pub fn sunday() -> NaiveDate {
        date(2026, 10, 18)
    }

    /// Unity Day, a Wednesday
    pub fn unity_day() -> NaiveDate {
        date(2026, 11, 4)
    }

    /// Russia Day, a Friday
    pub fn russia_day() -> NaiveDate {
        date(2026, 6, 12)
    }

    /// International Women's Day falls on a Sunday
    pub fn womens_day_on_sunday() -> NaiveDate {
        date(2026, 3, 8)
    }
}

/// Button payloads
pub mod tokens {
    pub const POWER_ON: &str = "power_on";
    pub const POWER_OFF: &str = "power_off";
    pub const REBOOT: &str = "reboot";
    pub const STATUS: &str = "status";
    pub const HOLIDAYS: &str = "holidays";
    pub const SCHEDULE: &str = "schedule";
}
