use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::{read_json, write_json};
use crate::constants::{defaults, trigger};
use crate::errors::ScheduleError;
use crate::scheduler::TriggerScheduler;

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Weekly working schedule. Field aliases read files written by the
/// previous camelCase layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Weekday indexes, 0 = Sunday .. 6 = Saturday, sorted and unique
    #[serde(alias = "workDays")]
    pub work_days: Vec<u8>,
    #[serde(alias = "startHour")]
    pub start_hour: u32,
    #[serde(alias = "endHour")]
    pub end_hour: u32,
    #[serde(alias = "serverStartMinutesBefore", default = "default_lead_minutes")]
    pub lead_minutes: u32,
    #[serde(alias = "lastUpdated", default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(
        alias = "updatedBy",
        default,
        deserialize_with = "deserialize_updated_by"
    )]
    pub updated_by: Option<String>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            work_days: defaults::WORK_DAYS.to_vec(),
            start_hour: defaults::START_HOUR,
            end_hour: defaults::END_HOUR,
            lead_minutes: defaults::LEAD_MINUTES,
            last_updated: None,
            updated_by: None,
        }
    }
}

impl Schedule {
    pub fn is_working_day(&self, weekday_index: u8) -> bool {
        self.work_days.contains(&weekday_index)
    }

    pub fn working_day_names(&self) -> Vec<&'static str> {
        self.work_days
            .iter()
            .filter_map(|d| WEEKDAY_NAMES.get(*d as usize).copied())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        validate_hours(self.start_hour, self.end_hour)?;
        if self.work_days.is_empty() || self.work_days.iter().any(|d| *d > 6) {
            return Err(ScheduleError::NoWorkdays);
        }
        if self.lead_minutes > trigger::MAX_LEAD_MINUTES {
            return Err(ScheduleError::LeadTooLarge {
                minutes: self.lead_minutes,
                max: trigger::MAX_LEAD_MINUTES,
            });
        }
        Ok(())
    }
}

pub fn weekday_name(index: u8) -> &'static str {
    WEEKDAY_NAMES.get(index as usize).copied().unwrap_or("?")
}

fn validate_hours(start_hour: u32, end_hour: u32) -> Result<(), ScheduleError> {
    for (field, value) in [("start_hour", start_hour), ("end_hour", end_hour)] {
        if value > 23 {
            return Err(ScheduleError::HourOutOfRange {
                field: field.to_string(),
                value,
            });
        }
    }
    if start_hour >= end_hour {
        return Err(ScheduleError::StartNotBeforeEnd {
            start_hour,
            end_hour,
        });
    }
    Ok(())
}

fn default_lead_minutes() -> u32 {
    defaults::LEAD_MINUTES
}

// Older files stored the numeric chat user id here
fn deserialize_updated_by<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Owns the persisted schedule and its in-process cache
pub struct ScheduleStore {
    path: PathBuf,
    cached: RwLock<Option<Schedule>>,
    write_lock: Mutex<()>,
    trigger: Arc<dyn TriggerScheduler>,
}

impl ScheduleStore {
    pub fn new(path: PathBuf, trigger: Arc<dyn TriggerScheduler>) -> Self {
        Self {
            path,
            cached: RwLock::new(None),
            write_lock: Mutex::new(()),
            trigger,
        }
    }

    /// Cached schedule, loading it on first use
    pub async fn current(&self) -> Schedule {
        if let Some(schedule) = self.cached.read().await.as_ref() {
            return schedule.clone();
        }

        let mut cached = self.cached.write().await;
        if let Some(schedule) = cached.as_ref() {
            return schedule.clone();
        }
        let schedule = self.load_from_disk().await;
        *cached = Some(schedule.clone());
        schedule
    }

    /// Drop the cache; the next `current` reads the file again
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
        debug!("Schedule cache invalidated");
    }

    pub async fn reload(&self) -> Schedule {
        self.invalidate().await;
        self.current().await
    }

    async fn load_from_disk(&self) -> Schedule {
        match read_json::<Schedule>(&self.path).await {
            Ok(Some(schedule)) => match schedule.validate() {
                Ok(()) => schedule,
                Err(e) => {
                    warn!("Stored schedule is invalid ({}), using defaults", e);
                    Schedule::default()
                }
            },
            Ok(None) => {
                debug!("No schedule file at {}, using defaults", self.path.display());
                Schedule::default()
            }
            Err(e) => {
                error!("Failed to load schedule: {} - using defaults", e);
                Schedule::default()
            }
        }
    }

    pub async fn set_hours(
        &self,
        start_hour: u32,
        end_hour: u32,
        updated_by: Option<&str>,
    ) -> Result<Schedule, ScheduleError> {
        validate_hours(start_hour, end_hour)?;
        self.update(updated_by, |schedule| {
            schedule.start_hour = start_hour;
            schedule.end_hour = end_hour;
        })
        .await
    }

    /// Out-of-range indexes are dropped; duplicates collapse
    pub async fn set_workdays(
        &self,
        days: &[u8],
        updated_by: Option<&str>,
    ) -> Result<Schedule, ScheduleError> {
        let mut work_days: Vec<u8> = days.iter().copied().filter(|d| *d <= 6).collect();
        work_days.sort_unstable();
        work_days.dedup();
        if work_days.is_empty() {
            return Err(ScheduleError::NoWorkdays);
        }

        self.update(updated_by, move |schedule| schedule.work_days = work_days)
            .await
    }

    pub async fn set_lead_minutes(
        &self,
        minutes: u32,
        updated_by: Option<&str>,
    ) -> Result<Schedule, ScheduleError> {
        if minutes > trigger::MAX_LEAD_MINUTES {
            return Err(ScheduleError::LeadTooLarge {
                minutes,
                max: trigger::MAX_LEAD_MINUTES,
            });
        }
        self.update(updated_by, |schedule| schedule.lead_minutes = minutes)
            .await
    }

    async fn update<F>(&self, updated_by: Option<&str>, apply: F) -> Result<Schedule, ScheduleError>
    where
        F: FnOnce(&mut Schedule),
    {
        let _guard = self.write_lock.lock().await;

        let mut schedule = self.load_from_disk().await;
        apply(&mut schedule);
        schedule.validate()?;
        schedule.last_updated = Some(Utc::now());
        schedule.updated_by = updated_by.map(str::to_string);

        write_json(&self.path, &schedule).await?;
        self.invalidate().await;

        info!(
            "Schedule saved: days {:?}, {:02}:00-{:02}:00, lead {}m",
            schedule.work_days, schedule.start_hour, schedule.end_hour, schedule.lead_minutes
        );

        self.republish(&schedule).await;
        Ok(schedule)
    }

    /// Push the current schedule to the trigger scheduler
    pub async fn republish_triggers(&self) {
        let schedule = self.current().await;
        self.republish(&schedule).await;
    }

    async fn republish(&self, schedule: &Schedule) {
        if let Err(e) = self.trigger.reconfigure(schedule).await {
            error!("Failed to reconfigure check triggers: {}", e);
        }
    }
}
