//! Trigger scheduler that records every reconfiguration

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use power_manager::scheduler::TriggerScheduler;
use power_manager::store::Schedule;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingTrigger {
    applied: Mutex<Vec<Schedule>>,
    fail: AtomicBool,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn applied(&self) -> Vec<Schedule> {
        self.applied.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Schedule> {
        self.applied.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TriggerScheduler for RecordingTrigger {
    async fn reconfigure(&self, schedule: &Schedule) -> Result<()> {
        self.applied.lock().unwrap().push(schedule.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("crontab is not writable"));
        }
        Ok(())
    }
}
