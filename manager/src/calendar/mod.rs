//! Holiday calendar and day classification
//!
//! The calendar answers two questions for the decision engine: what kind of
//! day a date is (weekend, scheduled workday, public holiday) and which
//! holidays are coming up. Only `public` entries make a day ambiguous; bank,
//! optional and observance entries are shown to the operator but never skip
//! or prompt.

pub mod russia;

pub use russia::RussianCalendar;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    Public,
    Bank,
    Optional,
    Observance,
}

impl HolidayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayKind::Public => "public",
            HolidayKind::Bank => "bank",
            HolidayKind::Optional => "optional",
            HolidayKind::Observance => "observance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    pub kind: HolidayKind,
}

/// Source of dated holiday entries
pub trait HolidayCalendar: Send + Sync {
    /// Every entry for `date`, in calendar order
    fn holidays_on(&self, date: NaiveDate) -> Vec<Holiday>;
}

/// Classification of a single date against the calendar and the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayInfo {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub is_public_holiday: bool,
    pub holiday_name: Option<String>,
    pub holiday_kind: Option<HolidayKind>,
    pub is_weekend: bool,
    pub is_scheduled_workday: bool,
    pub needs_confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingHoliday {
    pub date: NaiveDate,
    pub name: String,
    pub kind: HolidayKind,
    pub is_weekend: bool,
    pub is_public_holiday: bool,
}

/// Fixed weekend rule: Saturday and Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekday index with 0 = Sunday .. 6 = Saturday
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[derive(Clone)]
pub struct CalendarProvider {
    calendar: Arc<dyn HolidayCalendar>,
}

impl CalendarProvider {
    pub fn new(calendar: Arc<dyn HolidayCalendar>) -> Self {
        Self { calendar }
    }

    /// A public entry wins over informational ones on the same date
    fn primary_holiday(&self, date: NaiveDate) -> Option<Holiday> {
        let mut holidays = self.calendar.holidays_on(date);
        let public_index = holidays
            .iter()
            .position(|h| h.kind == HolidayKind::Public);
        match public_index {
            Some(index) => Some(holidays.swap_remove(index)),
            None => holidays.into_iter().next(),
        }
    }

    pub fn day_info(&self, date: NaiveDate, schedule: &Schedule) -> DayInfo {
        let holiday = self.primary_holiday(date);
        let is_weekend = is_weekend(date);
        let is_scheduled_workday = schedule.is_working_day(weekday_index(date));
        let is_public_holiday = holiday
            .as_ref()
            .map(|h| h.kind == HolidayKind::Public)
            .unwrap_or(false);

        DayInfo {
            date,
            is_holiday: holiday.is_some(),
            is_public_holiday,
            holiday_name: holiday.as_ref().map(|h| h.name.clone()),
            holiday_kind: holiday.as_ref().map(|h| h.kind),
            is_weekend,
            is_scheduled_workday,
            needs_confirmation: is_public_holiday && !is_weekend && is_scheduled_workday,
        }
    }

    /// Holidays in `[today, today + window_days)`, ascending by date
    pub fn upcoming(&self, today: NaiveDate, window_days: u32) -> Vec<UpcomingHoliday> {
        (0..i64::from(window_days))
            .map(|offset| today + Duration::days(offset))
            .filter_map(|date| {
                self.primary_holiday(date).map(|holiday| UpcomingHoliday {
                    date,
                    is_weekend: is_weekend(date),
                    is_public_holiday: holiday.kind == HolidayKind::Public,
                    name: holiday.name,
                    kind: holiday.kind,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TableCalendar(Vec<Holiday>);

    impl HolidayCalendar for TableCalendar {
        fn holidays_on(&self, date: NaiveDate) -> Vec<Holiday> {
            self.0.iter().filter(|h| h.date == date).cloned().collect()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(date: NaiveDate, name: &str, kind: HolidayKind) -> Holiday {
        Holiday {
            date,
            name: name.to_string(),
            kind,
        }
    }

    fn provider(entries: Vec<Holiday>) -> CalendarProvider {
        CalendarProvider::new(Arc::new(TableCalendar(entries)))
    }

    #[test]
    fn test_weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(date(2026, 10, 18)), 0); // Sunday
        assert_eq!(weekday_index(date(2026, 10, 19)), 1); // Monday
        assert_eq!(weekday_index(date(2026, 10, 17)), 6); // Saturday
    }

    #[test]
    fn test_public_holiday_on_workday_needs_confirmation() {
        let wednesday = date(2026, 11, 4);
        let calendar = provider(vec![holiday(wednesday, "Unity Day", HolidayKind::Public)]);

        let info = calendar.day_info(wednesday, &Schedule::default());

        assert!(info.is_holiday);
        assert!(info.is_public_holiday);
        assert!(info.is_scheduled_workday);
        assert!(!info.is_weekend);
        assert!(info.needs_confirmation);
        assert_eq!(info.holiday_name.as_deref(), Some("Unity Day"));
    }

    #[test]
    fn test_observance_never_needs_confirmation() {
        let monday = date(2026, 4, 13);
        let calendar = provider(vec![holiday(monday, "Some Day", HolidayKind::Observance)]);

        let info = calendar.day_info(monday, &Schedule::default());

        assert!(info.is_holiday);
        assert!(!info.is_public_holiday);
        assert!(!info.needs_confirmation);
    }

    #[test]
    fn test_weekend_holiday_never_needs_confirmation() {
        let saturday = date(2026, 3, 7);
        let calendar = provider(vec![holiday(saturday, "Holiday", HolidayKind::Public)]);
        let mut schedule = Schedule::default();
        schedule.work_days = vec![0, 1, 2, 3, 4, 5, 6];

        let info = calendar.day_info(saturday, &schedule);

        assert!(info.is_weekend);
        assert!(!info.needs_confirmation);
    }

    #[test]
    fn test_public_entry_is_primary() {
        let day = date(2026, 1, 7);
        let calendar = provider(vec![
            holiday(day, "Informational", HolidayKind::Observance),
            holiday(day, "Christmas", HolidayKind::Public),
        ]);

        let info = calendar.day_info(day, &Schedule::default());

        assert_eq!(info.holiday_name.as_deref(), Some("Christmas"));
        assert!(info.is_public_holiday);
    }

    #[test]
    fn test_upcoming_window_is_half_open_and_sorted() {
        let today = date(2026, 5, 1);
        let calendar = provider(vec![
            holiday(date(2026, 5, 9), "Victory Day", HolidayKind::Public),
            holiday(date(2026, 5, 1), "Labour Day", HolidayKind::Public),
            holiday(date(2026, 5, 11), "Outside", HolidayKind::Public),
        ]);

        let upcoming = calendar.upcoming(today, 10);

        let names: Vec<&str> = upcoming.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Labour Day", "Victory Day"]);
        assert!(upcoming[1].is_weekend); // 2026-05-09 is a Saturday
    }
}
