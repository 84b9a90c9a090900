//! Periodic check triggers derived from the weekly schedule
//!
//! Two checks run on every working weekday:
//!
//! - start-check at `start_hour:00 - lead_minutes` (moves to the previous
//!   day when the lead crosses midnight)
//! - stop-check at `end_hour:05`
//!
//! The plan is published either as user crontab lines that launch the binary
//! with `--check-start` / `--check-stop`, or as in-process jobs on a
//! `tokio-cron-scheduler` instance for a resident listener.

pub mod crontab;
pub mod jobs;

pub use crontab::CrontabTrigger;
pub use jobs::{CronJobTrigger, DisabledTrigger};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::constants::trigger;
use crate::store::schedule::weekday_name;
use crate::store::Schedule;

/// Receives the schedule after every update and republishes the triggers
#[async_trait]
pub trait TriggerScheduler: Send + Sync {
    async fn reconfigure(&self, schedule: &Schedule) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Start,
    Stop,
}

impl CheckKind {
    pub fn cli_flag(&self) -> &'static str {
        match self {
            CheckKind::Start => "--check-start",
            CheckKind::Stop => "--check-stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerTime {
    pub hour: u32,
    pub minute: u32,
    /// 0 = Sunday .. 6 = Saturday, ascending
    pub weekdays: Vec<u8>,
}

impl TriggerTime {
    /// Five-field crontab expression (`min hour dom month dow`)
    pub fn crontab_expression(&self) -> String {
        let days: Vec<String> = self.weekdays.iter().map(u8::to_string).collect();
        format!("{} {} * * {}", self.minute, self.hour, days.join(","))
    }

    /// Six-field expression for tokio-cron-scheduler (`sec min hour dom month dow`)
    ///
    /// Weekdays are spelled by name so the numbering convention of the cron
    /// parser does not matter.
    pub fn job_expression(&self) -> String {
        let days: Vec<&str> = self.weekdays.iter().map(|d| weekday_name(*d)).collect();
        format!("0 {} {} * * {}", self.minute, self.hour, days.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerPlan {
    pub start: TriggerTime,
    pub stop: TriggerTime,
}

impl TriggerPlan {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let start_minutes = i64::from(schedule.start_hour) * 60 - i64::from(schedule.lead_minutes);

        let (start_minutes, start_days) = if start_minutes < 0 {
            let previous_days = shift_weekdays_back(&schedule.work_days);
            (start_minutes + 24 * 60, previous_days)
        } else {
            (start_minutes, schedule.work_days.clone())
        };

        Self {
            start: TriggerTime {
                hour: (start_minutes / 60) as u32,
                minute: (start_minutes % 60) as u32,
                weekdays: start_days,
            },
            stop: TriggerTime {
                hour: schedule.end_hour,
                minute: trigger::STOP_CHECK_MINUTE,
                weekdays: schedule.work_days.clone(),
            },
        }
    }

    pub fn entries(&self) -> [(CheckKind, &TriggerTime); 2] {
        [(CheckKind::Start, &self.start), (CheckKind::Stop, &self.stop)]
    }
}

fn shift_weekdays_back(days: &[u8]) -> Vec<u8> {
    let mut shifted: Vec<u8> = days.iter().map(|d| (d + 6) % 7).collect();
    shifted.sort_unstable();
    shifted.dedup();
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(work_days: Vec<u8>, start_hour: u32, end_hour: u32, lead_minutes: u32) -> Schedule {
        Schedule {
            work_days,
            start_hour,
            end_hour,
            lead_minutes,
            ..Schedule::default()
        }
    }

    #[test]
    fn test_default_plan() {
        let plan = TriggerPlan::from_schedule(&Schedule::default());

        assert_eq!(plan.start.hour, 7);
        assert_eq!(plan.start.minute, 55);
        assert_eq!(plan.start.weekdays, vec![1, 2, 3, 4, 5]);
        assert_eq!(plan.stop.hour, 18);
        assert_eq!(plan.stop.minute, 5);
        assert_eq!(plan.start.crontab_expression(), "55 7 * * 1,2,3,4,5");
        assert_eq!(plan.stop.job_expression(), "0 5 18 * * Mon,Tue,Wed,Thu,Fri");
    }

    #[test]
    fn test_zero_lead_starts_on_the_hour() {
        let plan = TriggerPlan::from_schedule(&schedule(vec![1], 9, 17, 0));
        assert_eq!((plan.start.hour, plan.start.minute), (9, 0));
    }

    #[test]
    fn test_lead_crossing_midnight_moves_to_previous_day() {
        let plan = TriggerPlan::from_schedule(&schedule(vec![0, 1, 5], 0, 6, 30));

        assert_eq!((plan.start.hour, plan.start.minute), (23, 30));
        // Sun -> Sat, Mon -> Sun, Fri -> Thu
        assert_eq!(plan.start.weekdays, vec![0, 4, 6]);
        assert_eq!(plan.stop.weekdays, vec![0, 1, 5]);
    }

    #[test]
    fn test_check_flags() {
        assert_eq!(CheckKind::Start.cli_flag(), "--check-start");
        assert_eq!(CheckKind::Stop.cli_flag(), "--check-stop");
    }
}
