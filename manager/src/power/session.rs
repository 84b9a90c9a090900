use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

/// Opens the remote interactive session on a freshly booted server
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<()>;
}

/// Runs the configured shell command (typically an RDP connect script)
pub struct ShellSessionLauncher {
    command: Option<String>,
}

impl ShellSessionLauncher {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SessionLauncher for ShellSessionLauncher {
    async fn launch(&self) -> Result<()> {
        let command = self
            .command
            .as_deref()
            .ok_or_else(|| anyhow!("No session command configured"))?;

        debug!("Executing session command: {}", command);

        let output = AsyncCommand::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|e| anyhow!("Failed to run session command: {}", e))?;

        if output.status.success() {
            info!(
                "Session command finished: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let error_msg = if !stderr.trim().is_empty() { stderr } else { stdout };
            Err(anyhow!("Session command failed: {}", error_msg.trim()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_command_is_an_error() {
        let launcher = ShellSessionLauncher::new(None);
        assert!(launcher.launch().await.is_err());
    }

    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        let launcher = ShellSessionLauncher::new(Some("echo boom >&2; exit 3".to_string()));
        let err = launcher.launch().await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_successful_command() {
        let launcher = ShellSessionLauncher::new(Some("true".to_string()));
        assert!(launcher.launch().await.is_ok());
    }
}
