//! Guard for manual power operations
//!
//! Chat buttons and HTTP endpoints can both toggle the server. Only one
//! manual operation (power on/off, reboot, on-demand check) may run at a
//! time; a second request is refused with a description of what is already
//! running. Scheduled checks do not go through the tracker.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ActiveOperation {
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub initiated_by: Option<String>,
}

#[derive(Clone, Default)]
pub struct PowerOperationTracker {
    active: Arc<RwLock<Option<ActiveOperation>>>,
}

impl PowerOperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self))]
    pub async fn try_start(&self, operation: &str, initiated_by: Option<String>) -> Result<()> {
        let mut active = self.active.write().await;

        if let Some(current) = active.as_ref() {
            let duration = Utc::now().signed_duration_since(current.started_at);
            return Err(anyhow!(
                "Server is busy with '{}' (started {}s ago), try again when it finishes",
                current.operation,
                duration.num_seconds()
            ));
        }

        *active = Some(ActiveOperation {
            operation: operation.to_string(),
            started_at: Utc::now(),
            initiated_by,
        });
        info!("Started manual operation '{}'", operation);
        Ok(())
    }

    pub async fn finish(&self) {
        if let Some(op) = self.active.write().await.take() {
            let duration = Utc::now().signed_duration_since(op.started_at);
            info!(
                "Finished manual operation '{}' (took {}s)",
                op.operation,
                duration.num_seconds()
            );
        }
    }

    pub async fn current(&self) -> Option<ActiveOperation> {
        self.active.read().await.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Release an operation older than `max_hours`; true if one was dropped
    pub async fn cleanup_stale(&self, max_hours: i64) -> bool {
        let mut active = self.active.write().await;
        let cutoff = Utc::now() - chrono::Duration::hours(max_hours);

        match active.as_ref() {
            Some(op) if op.started_at <= cutoff => {
                warn!(
                    "Released stuck operation '{}' (running since {})",
                    op.operation, op.started_at
                );
                *active = None;
                true
            }
            _ => false,
        }
    }
}
