use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

use super::{TriggerPlan, TriggerScheduler};
use crate::constants::trigger::CRONTAB_MARKER;
use crate::store::Schedule;

/// Keeps the tagged lines of the user crontab in sync with the schedule
pub struct CrontabTrigger {
    command: String,
    log_path: Option<String>,
}

impl CrontabTrigger {
    /// `command` is the shell prefix launching this binary, including any
    /// `--config` argument
    pub fn new(command: String, log_path: Option<String>) -> Self {
        Self { command, log_path }
    }

    async fn read_crontab(&self) -> Result<String> {
        let output = AsyncCommand::new("crontab")
            .arg("-l")
            .output()
            .await
            .context("Failed to run crontab -l")?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            // "no crontab for user" is an empty table
            debug!(
                "crontab -l exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(String::new())
        }
    }

    async fn write_crontab(&self, content: &str) -> Result<()> {
        let mut child = AsyncCommand::new("crontab")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn crontab")?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("crontab stdin was not captured"))?;
        stdin
            .write_all(content.as_bytes())
            .await
            .context("Failed to write crontab content")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for crontab")?;

        if output.status.success() {
            Ok(())
        } else {
            Err(anyhow!(
                "crontab rejected the new table: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

#[async_trait]
impl TriggerScheduler for CrontabTrigger {
    async fn reconfigure(&self, schedule: &Schedule) -> Result<()> {
        let plan = TriggerPlan::from_schedule(schedule);
        let existing = self.read_crontab().await?;
        let updated = render_crontab(&existing, &plan, &self.command, self.log_path.as_deref());

        self.write_crontab(&updated).await?;

        info!(
            "✓ Crontab updated: start '{}', stop '{}'",
            plan.start.crontab_expression(),
            plan.stop.crontab_expression()
        );
        Ok(())
    }
}

/// Replace every tagged line of `existing` with the lines for `plan`;
/// untagged lines are kept in order
pub fn render_crontab(
    existing: &str,
    plan: &TriggerPlan,
    command: &str,
    log_path: Option<&str>,
) -> String {
    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| !line.contains(CRONTAB_MARKER))
        .map(str::to_string)
        .collect();

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let redirect = log_path
        .map(|path| format!(" >> {} 2>&1", path))
        .unwrap_or_default();

    for (kind, time) in plan.entries() {
        lines.push(format!(
            "{} {} {}{} {}",
            time.crontab_expression(),
            command,
            kind.cli_flag(),
            redirect,
            CRONTAB_MARKER
        ));
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}
