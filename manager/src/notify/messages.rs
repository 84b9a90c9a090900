//! Operator-facing texts sent by the engine and the sequencer

use chrono::NaiveDate;
use std::time::Duration;

use super::{Button, OutgoingMessage};
use crate::engine::ConfirmationToken;
use crate::power::{PowerAction, ServerStatus};
use crate::store::Decision;

pub fn server_starting(boot_wait: Duration) -> String {
    format!(
        "Server power-on requested. Waiting {}s for the system to boot.",
        boot_wait.as_secs()
    )
}

pub fn session_ready() -> String {
    "Server is up and the remote session has been started.".to_string()
}

pub fn power_on_failed(reason: &str) -> String {
    format!("Failed to power on the server: {}", reason)
}

pub fn status_failed(reason: &str) -> String {
    format!("Failed to read server status: {}", reason)
}

pub fn shutting_down() -> String {
    "Working day is over, shutting the server down.".to_string()
}

pub fn shutdown_failed(reason: &str) -> String {
    format!("Failed to shut the server down: {}", reason)
}

pub fn decision_not_saved(date: NaiveDate, reason: &str) -> String {
    format!("Could not save the decision for {}: {}", date, reason)
}

/// Two-choice prompt for a holiday that falls on a working day
pub fn holiday_prompt(date: NaiveDate, holiday_name: &str) -> OutgoingMessage {
    let run = ConfirmationToken::new(date, Decision::Run);
    let skip = ConfirmationToken::new(date, Decision::Skip);

    OutgoingMessage::text(format!(
        "{} is a public holiday ({}), but it is a working day in the schedule.\n\
         Start the server today?",
        date.format("%d.%m.%Y"),
        holiday_name
    ))
    .with_row(vec![
        Button::new("Yes, start", run.to_string()),
        Button::new("No, stay off", skip.to_string()),
    ])
}

pub fn confirmation_resolved(date: NaiveDate, decision: Decision, was_already_decided: bool) -> String {
    let verdict = match decision {
        Decision::Run => "start the server",
        Decision::Skip => "keep the server off",
    };
    if was_already_decided {
        format!(
            "{} was already decided: {}.",
            date.format("%d.%m.%Y"),
            verdict
        )
    } else {
        format!("Decision for {}: {}.", date.format("%d.%m.%Y"), verdict)
    }
}

pub fn confirmation_expired(date: NaiveDate, decision: Decision) -> String {
    let verdict = match decision {
        Decision::Run => "starting the server",
        Decision::Skip => "keeping the server off",
    };
    format!(
        "No answer for {} in time, {} by default.",
        date.format("%d.%m.%Y"),
        verdict
    )
}

pub fn stale_confirmation(date: NaiveDate) -> String {
    format!(
        "The answer for {} was saved, but that date is not today so nothing was started.",
        date.format("%d.%m.%Y")
    )
}

pub fn toggle_sending(action: PowerAction) -> String {
    format!("Sending {} command...", action)
}

pub fn toggle_waiting(action: PowerAction, tick: u32, elapsed: Duration) -> String {
    let target = match action.expected_power_state() {
        Some(true) => "power on",
        _ => "power off",
    };
    let dots = ".".repeat((tick as usize % 3) + 1);
    format!(
        "Waiting for the server to {}{} ({}s)",
        target,
        dots,
        elapsed.as_secs()
    )
}

pub fn toggle_reached(action: PowerAction, status: &ServerStatus, elapsed: Duration) -> String {
    match action.expected_power_state() {
        Some(true) => format!(
            "Server is powered on. IP: {}. Took {}s.",
            status.address.as_deref().unwrap_or("unknown"),
            elapsed.as_secs()
        ),
        _ => format!("Server is powered off. Took {}s.", elapsed.as_secs()),
    }
}

pub fn toggle_timeout(action: PowerAction) -> String {
    format!(
        "Timed out waiting for {} to finish. Check the server status manually.",
        action
    )
}

pub fn toggle_failed(action: PowerAction, reason: &str) -> String {
    format!("{} failed: {}", capitalize(&action.to_string()), reason)
}

pub fn reboot_sent() -> String {
    "Reboot command sent. The server will be back in a few minutes.".to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
