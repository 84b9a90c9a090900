//! Built-in Russian Federation holiday calendar
//!
//! Statutory non-working holidays (Labour Code, art. 112) are `public`; the
//! remaining entries are observances shown for information only. Transfer
//! days decreed per year are not in the table and belong in
//! `[[calendar.extra_holidays]]`.

use chrono::{Datelike, NaiveDate};

use super::{Holiday, HolidayCalendar, HolidayKind};
use crate::config::ExtraHoliday;

struct FixedEntry {
    month: u32,
    day: u32,
    name: &'static str,
    kind: HolidayKind,
}

const fn public(month: u32, day: u32, name: &'static str) -> FixedEntry {
    FixedEntry {
        month,
        day,
        name,
        kind: HolidayKind::Public,
    }
}

const fn observance(month: u32, day: u32, name: &'static str) -> FixedEntry {
    FixedEntry {
        month,
        day,
        name,
        kind: HolidayKind::Observance,
    }
}

const FIXED_ENTRIES: &[FixedEntry] = &[
    public(1, 1, "New Year's Day"),
    public(1, 2, "New Year Holiday"),
    public(1, 3, "New Year Holiday"),
    public(1, 4, "New Year Holiday"),
    public(1, 5, "New Year Holiday"),
    public(1, 6, "New Year Holiday"),
    public(1, 7, "Orthodox Christmas Day"),
    public(1, 8, "New Year Holiday"),
    observance(1, 25, "Tatiana Day"),
    public(2, 23, "Defender of the Fatherland Day"),
    public(3, 8, "International Women's Day"),
    observance(4, 12, "Cosmonautics Day"),
    public(5, 1, "Spring and Labour Day"),
    public(5, 9, "Victory Day"),
    public(6, 12, "Russia Day"),
    observance(9, 1, "Day of Knowledge"),
    public(11, 4, "Unity Day"),
    observance(12, 12, "Constitution Day"),
    observance(12, 31, "New Year's Eve"),
];

/// Fixed-date table plus configured dated entries
#[derive(Debug, Clone, Default)]
pub struct RussianCalendar {
    extra: Vec<Holiday>,
}

impl RussianCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_holidays(extra: &[ExtraHoliday]) -> Self {
        Self {
            extra: extra
                .iter()
                .map(|e| Holiday {
                    date: e.date,
                    name: e.name.clone(),
                    kind: e.kind,
                })
                .collect(),
        }
    }
}

impl HolidayCalendar for RussianCalendar {
    fn holidays_on(&self, date: NaiveDate) -> Vec<Holiday> {
        let fixed = FIXED_ENTRIES
            .iter()
            .filter(|e| e.month == date.month() && e.day == date.day())
            .map(|e| Holiday {
                date,
                name: e.name.to_string(),
                kind: e.kind,
            });

        let extra = self.extra.iter().filter(|h| h.date == date).cloned();

        fixed.chain(extra).collect()
    }
}
