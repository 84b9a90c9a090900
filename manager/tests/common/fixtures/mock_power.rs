//! In-memory power controller
//!
//! Tracks a single power flag. Accepted power-on/shut-down requests flip
//! the flag immediately unless `hold_state` is set, which models a server
//! that never reaches the requested state.

use async_trait::async_trait;
use power_manager::errors::RemoteApiError;
use power_manager::power::{PowerAction, PowerController, ServerStatus};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct PowerCall {
    pub action: PowerAction,
    pub at: Instant,
}

#[derive(Default)]
struct State {
    is_on: bool,
    hold_state: bool,
    status_error: Option<String>,
    request_error: Option<String>,
    status_polls: usize,
    requests: Vec<PowerCall>,
}

#[derive(Default)]
pub struct MockPower {
    state: Mutex<State>,
}

impl MockPower {
    pub fn off() -> Self {
        Self::default()
    }

    pub fn on() -> Self {
        let power = Self::default();
        power.state.lock().unwrap().is_on = true;
        power
    }

    pub fn set_on(&self, is_on: bool) {
        self.state.lock().unwrap().is_on = is_on;
    }

    pub fn is_on(&self) -> bool {
        self.state.lock().unwrap().is_on
    }

    /// Accept requests without ever changing the power flag
    pub fn hold_state(&self) {
        self.state.lock().unwrap().hold_state = true;
    }

    pub fn fail_status(&self, message: &str) {
        self.state.lock().unwrap().status_error = Some(message.to_string());
    }

    pub fn fail_requests(&self, message: &str) {
        self.state.lock().unwrap().request_error = Some(message.to_string());
    }

    pub fn requests(&self) -> Vec<PowerCall> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self, action: PowerAction) -> usize {
        self.requests()
            .iter()
            .filter(|call| call.action == action)
            .count()
    }

    pub fn status_polls(&self) -> usize {
        self.state.lock().unwrap().status_polls
    }
}

#[async_trait]
impl PowerController for MockPower {
    async fn status(&self) -> Result<ServerStatus, RemoteApiError> {
        let mut state = self.state.lock().unwrap();
        state.status_polls += 1;

        if let Some(message) = &state.status_error {
            return Err(RemoteApiError::Rejected {
                operation: "get_status".to_string(),
                status: 500,
                message: message.clone(),
            });
        }

        Ok(ServerStatus {
            is_powered_on: state.is_on,
            address: Some("203.0.113.10".to_string()),
            name: Some("office-1".to_string()),
            state: Some(if state.is_on { "Active" } else { "Stopped" }.to_string()),
            ..Default::default()
        })
    }

    async fn request(&self, action: PowerAction) -> Result<(), RemoteApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(PowerCall {
            action,
            at: Instant::now(),
        });

        if let Some(message) = &state.request_error {
            return Err(RemoteApiError::Rejected {
                operation: action.api_type().to_string(),
                status: 400,
                message: message.clone(),
            });
        }

        if !state.hold_state {
            if let Some(target) = action.expected_power_state() {
                state.is_on = target;
            }
        }
        Ok(())
    }
}
