//! Remote server power control
//!
//! `PowerController` is the only way the rest of the program touches the
//! cloud API. The sequencer builds the start, stop and interactive toggle
//! flows on top of it; remote state is re-polled for every decision and
//! never cached.

pub mod cloud;
pub mod sequencer;
pub mod session;

pub use cloud::CloudApiClient;
pub use sequencer::{PowerSequencer, ToggleOutcome};
pub use session::{SessionLauncher, ShellSessionLauncher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::RemoteApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    PowerOn,
    ShutDown,
    Reboot,
}

impl PowerAction {
    /// Action type understood by the cloud API
    pub fn api_type(&self) -> &'static str {
        match self {
            PowerAction::PowerOn => "PowerOn",
            PowerAction::ShutDown => "ShutDownGuestOS",
            PowerAction::Reboot => "PowerReboot",
        }
    }

    /// Power state the server settles in; reboot has none worth waiting for
    pub fn expected_power_state(&self) -> Option<bool> {
        match self {
            PowerAction::PowerOn => Some(true),
            PowerAction::ShutDown => Some(false),
            PowerAction::Reboot => None,
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerAction::PowerOn => "power on",
            PowerAction::ShutDown => "shut down",
            PowerAction::Reboot => "reboot",
        };
        f.write_str(name)
    }
}

impl FromStr for PowerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" | "power_on" | "start" => Ok(PowerAction::PowerOn),
            "off" | "power_off" | "shutdown" | "stop" => Ok(PowerAction::ShutDown),
            "reboot" | "restart" => Ok(PowerAction::Reboot),
            other => Err(format!("Unknown power action: {}", other)),
        }
    }
}

/// Server state as reported by the cloud API. Field aliases match the API's
/// PascalCase names; serialization uses snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(alias = "IsPowerOn")]
    pub is_powered_on: bool,
    #[serde(alias = "IP", default)]
    pub address: Option<String>,
    #[serde(alias = "Name", default)]
    pub name: Option<String>,
    #[serde(alias = "Image", default)]
    pub image: Option<String>,
    #[serde(alias = "CPU", default)]
    pub cpu: Option<u32>,
    /// Megabytes
    #[serde(alias = "RAM", default)]
    pub ram: Option<u64>,
    /// Gigabytes
    #[serde(alias = "HDD", default)]
    pub hdd: Option<u64>,
    #[serde(alias = "State", default)]
    pub state: Option<String>,
}

#[async_trait]
pub trait PowerController: Send + Sync {
    async fn status(&self) -> Result<ServerStatus, RemoteApiError>;

    async fn request(&self, action: PowerAction) -> Result<(), RemoteApiError>;
}
