use std::fmt;

use crate::engine::ConfirmationToken;
use crate::notify::Button;
use crate::power::PowerAction;

pub const SETTIME_USAGE: &str = "Usage: /settime <start> <end>, e.g. /settime 9 18";
pub const SETDAYS_USAGE: &str =
    "Usage: /setdays <days>, e.g. /setdays 1,2,3,4,5 (0=Sun, 1=Mon .. 6=Sat)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Check,
    Schedule,
    SetTime { start_hour: u32, end_hour: u32 },
    SetDays(Vec<u8>),
    Holidays,
}

/// Names and descriptions registered with the chat API
pub const COMMAND_LIST: &[(&str, &str)] = &[
    ("start", "Show controls and the automatic schedule"),
    ("check", "Show today's status"),
    ("schedule", "Show the working schedule"),
    ("settime", "Set working hours: /settime 9 18"),
    ("setdays", "Set working days: /setdays 1,2,3,4,5"),
    ("holidays", "List upcoming holidays"),
];

/// `None` for plain text and unknown commands; `Some(Err(usage))` for a
/// known command with bad arguments
pub fn parse_command(text: &str) -> Option<Result<BotCommand, &'static str>> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    // Group chats address commands as /cmd@botname
    let name = head.split('@').next().unwrap_or(head);

    let command = match name {
        "start" => Ok(BotCommand::Start),
        "check" => Ok(BotCommand::Check),
        "schedule" => Ok(BotCommand::Schedule),
        "holidays" => Ok(BotCommand::Holidays),
        "settime" => parse_settime(args),
        "setdays" => parse_setdays(args),
        _ => return None,
    };
    Some(command)
}

fn parse_settime(args: &str) -> Result<BotCommand, &'static str> {
    let values: Vec<u32> = args
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| SETTIME_USAGE)?;

    match values.as_slice() {
        [start_hour, end_hour] => Ok(BotCommand::SetTime {
            start_hour: *start_hour,
            end_hour: *end_hour,
        }),
        _ => Err(SETTIME_USAGE),
    }
}

fn parse_setdays(args: &str) -> Result<BotCommand, &'static str> {
    let days: Vec<u8> = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .filter(|day| *day <= 6)
        .collect();

    if days.is_empty() {
        Err(SETDAYS_USAGE)
    } else {
        Ok(BotCommand::SetDays(days))
    }
}

/// Inline button payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Power(PowerAction),
    Status,
    Holidays,
    Schedule,
    Confirm(ConfirmationToken),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "power_on" => Some(CallbackAction::Power(PowerAction::PowerOn)),
            "power_off" => Some(CallbackAction::Power(PowerAction::ShutDown)),
            "reboot" => Some(CallbackAction::Power(PowerAction::Reboot)),
            "status" => Some(CallbackAction::Status),
            "holidays" => Some(CallbackAction::Holidays),
            "schedule" => Some(CallbackAction::Schedule),
            other => ConfirmationToken::parse(other).map(CallbackAction::Confirm),
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::Power(PowerAction::PowerOn) => f.write_str("power_on"),
            CallbackAction::Power(PowerAction::ShutDown) => f.write_str("power_off"),
            CallbackAction::Power(PowerAction::Reboot) => f.write_str("reboot"),
            CallbackAction::Status => f.write_str("status"),
            CallbackAction::Holidays => f.write_str("holidays"),
            CallbackAction::Schedule => f.write_str("schedule"),
            CallbackAction::Confirm(token) => write!(f, "{}", token),
        }
    }
}

fn button(label: &str, action: CallbackAction) -> Button {
    Button::new(label, action.to_string())
}

/// Control keyboard attached to status-like replies
pub fn main_keyboard() -> Vec<Vec<Button>> {
    vec![
        vec![
            button("Power on", CallbackAction::Power(PowerAction::PowerOn)),
            button("Power off", CallbackAction::Power(PowerAction::ShutDown)),
        ],
        vec![
            button("Reboot", CallbackAction::Power(PowerAction::Reboot)),
            button("Status", CallbackAction::Status),
        ],
        vec![
            button("Holidays", CallbackAction::Holidays),
            button("Schedule", CallbackAction::Schedule),
        ],
    ]
}
