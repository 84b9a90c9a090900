use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono_tz::Tz;
use tokio::sync::{mpsc, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{CheckKind, TriggerPlan, TriggerScheduler};
use crate::store::Schedule;

/// In-process triggers: each job sends its check kind to the listener,
/// which runs the check itself
pub struct CronJobTrigger {
    scheduler: JobScheduler,
    timezone: Tz,
    sender: mpsc::Sender<CheckKind>,
    job_ids: Mutex<Vec<Uuid>>,
}

impl CronJobTrigger {
    pub async fn new(timezone: Tz, sender: mpsc::Sender<CheckKind>) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            scheduler,
            timezone,
            sender,
            job_ids: Mutex::new(Vec::new()),
        })
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start JobScheduler: {}", e))?;
        info!("In-process check scheduler started ({})", self.timezone);
        Ok(())
    }

    async fn add_job(&self, kind: CheckKind, expression: &str) -> Result<Uuid> {
        let sender = self.sender.clone();

        let job = Job::new_async_tz(expression, self.timezone, move |_uuid, _scheduler| {
            let sender = sender.clone();
            Box::pin(async move {
                info!("Scheduled {:?} check fired", kind);
                if sender.send(kind).await.is_err() {
                    warn!("Check receiver is gone, dropping {:?} trigger", kind);
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create {:?} job for '{}': {}", kind, expression, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add {:?} job to scheduler: {}", kind, e))
    }
}

#[async_trait]
impl TriggerScheduler for CronJobTrigger {
    #[instrument(skip(self, schedule))]
    async fn reconfigure(&self, schedule: &Schedule) -> Result<()> {
        let plan = TriggerPlan::from_schedule(schedule);
        let mut job_ids = self.job_ids.lock().await;

        for id in job_ids.drain(..) {
            if let Err(e) = self.scheduler.remove(&id).await {
                warn!("Failed to remove check job {}: {}", id, e);
            }
        }

        for (kind, time) in plan.entries() {
            let expression = time.job_expression();
            let id = self.add_job(kind, &expression).await?;
            info!("✓ Scheduled {:?} check: {}", kind, expression);
            job_ids.push(id);
        }

        Ok(())
    }
}

/// Triggers managed outside this program
#[derive(Debug, Default)]
pub struct DisabledTrigger;

#[async_trait]
impl TriggerScheduler for DisabledTrigger {
    async fn reconfigure(&self, schedule: &Schedule) -> Result<()> {
        debug!(
            "Trigger management disabled, ignoring schedule {:?} {}-{}",
            schedule.work_days, schedule.start_hour, schedule.end_hour
        );
        Ok(())
    }
}
