use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, instrument, warn};

use super::{PowerAction, PowerController, ServerStatus, SessionLauncher};
use crate::config::SequencerTimings;
use crate::engine::{reasons, CheckAction, CheckOutcome, StopOutcome};
use crate::errors::RemoteApiError;
use crate::notify::{messages, MessageRef, Notifier, OutgoingMessage};

/// Result of an interactive power toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Target state observed (or command accepted, for reboot)
    Completed,
    TimedOut,
    Failed(String),
}

/// Drives the server through power transitions.
///
/// The automatic start path uses two fixed waits because guest boot and
/// session readiness are not observable; the interactive path polls the
/// power state and reports progress in place.
pub struct PowerSequencer {
    power: Arc<dyn PowerController>,
    notifier: Arc<dyn Notifier>,
    session: Arc<dyn SessionLauncher>,
    timings: SequencerTimings,
}

impl PowerSequencer {
    pub fn new(
        power: Arc<dyn PowerController>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionLauncher>,
        timings: SequencerTimings,
    ) -> Self {
        Self {
            power,
            notifier,
            session,
            timings,
        }
    }

    pub fn timings(&self) -> &SequencerTimings {
        &self.timings
    }

    pub async fn status(&self) -> Result<ServerStatus, RemoteApiError> {
        self.power.status().await
    }

    async fn notify(&self, text: String) {
        if let Err(e) = self.notifier.send(OutgoingMessage::text(text)).await {
            warn!("Notification failed: {}", e);
        }
    }

    /// Power on and bring the remote session up. Steps run strictly in
    /// order; neither wait can be cut short.
    #[instrument(skip(self))]
    pub async fn ensure_started(&self) -> CheckOutcome {
        match self.power.status().await {
            Ok(status) if status.is_powered_on => {
                info!("Server already powered on, nothing to start");
                return CheckOutcome::new(CheckAction::AlreadyRunning, reasons::SERVER_ALREADY_ON);
            }
            Ok(_) => info!("Server is off, powering on"),
            Err(e) => warn!("Status poll failed ({}), attempting power-on anyway", e),
        }

        if let Err(e) = self.power.request(PowerAction::PowerOn).await {
            error!("✗ Power-on failed: {}", e);
            self.notify(messages::power_on_failed(e.upstream_message()))
                .await;
            return CheckOutcome::error(e.upstream_message());
        }

        self.notify(messages::server_starting(self.timings.boot_wait))
            .await;

        info!("Boot wait: {}s", self.timings.boot_wait.as_secs());
        sleep(self.timings.boot_wait).await;

        self.launch_session();

        info!("Session settle wait: {}s", self.timings.session_settle.as_secs());
        sleep(self.timings.session_settle).await;

        self.notify(messages::session_ready()).await;
        info!("✓ Server started and session launched");
        CheckOutcome::new(CheckAction::Started, reasons::SERVER_POWERED_ON_RDP_CONNECTED)
    }

    /// Detached: the outcome is logged and never reaches the caller
    fn launch_session(&self) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            match session.launch().await {
                Ok(()) => info!("✓ Remote session launched"),
                Err(e) => error!("✗ Remote session launch failed: {}", e),
            }
        });
    }

    /// Guest shutdown if the server is on; does not wait for it to finish
    #[instrument(skip(self))]
    pub async fn ensure_stopped(&self) -> StopOutcome {
        let status = match self.power.status().await {
            Ok(status) => status,
            Err(e) => {
                error!("✗ Status poll before shutdown failed: {}", e);
                self.notify(messages::status_failed(e.upstream_message()))
                    .await;
                return StopOutcome::Failed(e.upstream_message().to_string());
            }
        };

        if !status.is_powered_on {
            info!("Server already off");
            return StopOutcome::AlreadyOff;
        }

        match self.power.request(PowerAction::ShutDown).await {
            Ok(()) => {
                info!("✓ Shutdown requested");
                self.notify(messages::shutting_down()).await;
                StopOutcome::Stopped
            }
            Err(e) => {
                error!("✗ Shutdown failed: {}", e);
                self.notify(messages::shutdown_failed(e.upstream_message()))
                    .await;
                StopOutcome::Failed(e.upstream_message().to_string())
            }
        }
    }

    /// Poll until the power state equals `expected`; true on match, false on
    /// timeout. `progress` is edited on every tick.
    pub async fn wait_until_power_state(
        &self,
        expected: bool,
        timeout: Duration,
        poll_interval: Duration,
        progress: Option<&MessageRef>,
    ) -> bool {
        let action = if expected {
            PowerAction::PowerOn
        } else {
            PowerAction::ShutDown
        };
        self.poll_power_state(action, expected, timeout, poll_interval, progress)
            .await
            .is_some()
    }

    async fn poll_power_state(
        &self,
        action: PowerAction,
        expected: bool,
        timeout: Duration,
        poll_interval: Duration,
        progress: Option<&MessageRef>,
    ) -> Option<ServerStatus> {
        let started = Instant::now();
        let mut tick: u32 = 0;

        // One last poll lands on the deadline itself
        loop {
            match self.power.status().await {
                Ok(status) if status.is_powered_on == expected => return Some(status),
                Ok(_) => {}
                Err(e) => warn!("Status poll {} failed: {}", tick + 1, e),
            }

            let remaining = timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }

            if let Some(message) = progress {
                let text = messages::toggle_waiting(action, tick, started.elapsed());
                if let Err(e) = self
                    .notifier
                    .edit(message, OutgoingMessage::text(text))
                    .await
                {
                    warn!("Progress update failed: {}", e);
                }
            }

            sleep(poll_interval.min(remaining)).await;
            tick += 1;
        }

        warn!(
            "Server did not reach power state {} within {}s",
            expected,
            timeout.as_secs()
        );
        None
    }

    /// Interactive on/off/reboot with in-place progress. A new message is
    /// sent when `progress` is `None`.
    #[instrument(skip(self, progress))]
    pub async fn toggle(&self, action: PowerAction, progress: Option<MessageRef>) -> ToggleOutcome {
        let mut progress = progress;
        self.show(&mut progress, messages::toggle_sending(action)).await;

        if let Err(e) = self.power.request(action).await {
            error!("✗ Interactive {} failed: {}", action, e);
            self.show(&mut progress, messages::toggle_failed(action, e.upstream_message()))
                .await;
            return ToggleOutcome::Failed(e.upstream_message().to_string());
        }

        let Some(expected) = action.expected_power_state() else {
            self.show(&mut progress, messages::reboot_sent()).await;
            return ToggleOutcome::Completed;
        };

        let started = Instant::now();
        let reached = self
            .poll_power_state(
                action,
                expected,
                self.timings.poll_timeout,
                self.timings.poll_interval,
                progress.as_ref(),
            )
            .await;

        match reached {
            Some(status) => {
                info!("✓ Interactive {} completed", action);
                self.show(
                    &mut progress,
                    messages::toggle_reached(action, &status, started.elapsed()),
                )
                .await;
                ToggleOutcome::Completed
            }
            None => {
                self.show(&mut progress, messages::toggle_timeout(action))
                    .await;
                ToggleOutcome::TimedOut
            }
        }
    }

    async fn show(&self, progress: &mut Option<MessageRef>, text: String) {
        let message = OutgoingMessage::text(text);
        match progress {
            Some(target) => {
                if let Err(e) = self.notifier.edit(target, message).await {
                    warn!("Failed to update progress message: {}", e);
                }
            }
            None => match self.notifier.send(message).await {
                Ok(sent) => *progress = Some(sent),
                Err(e) => warn!("Failed to send progress message: {}", e),
            },
        }
    }
}
