//! Session launcher that records when it was asked to connect

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use power_manager::power::SessionLauncher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Default)]
pub struct RecordingSession {
    launches: Mutex<Vec<Instant>>,
    fail: AtomicBool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let session = Self::default();
        session.fail.store(true, Ordering::SeqCst);
        session
    }

    pub fn launches(&self) -> Vec<Instant> {
        self.launches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for RecordingSession {
    async fn launch(&self) -> Result<()> {
        self.launches.lock().unwrap().push(Instant::now());
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("remote desktop client exited with status 1"));
        }
        Ok(())
    }
}
