//! Plain-text views for chat replies

use chrono::Datelike;
use std::fmt::Write;

use crate::calendar::UpcomingHoliday;
use crate::constants::calendar::MAX_HOLIDAYS_PER_MONTH;
use crate::engine::TodayOverview;
use crate::errors::RemoteApiError;
use crate::power::ServerStatus;
use crate::scheduler::TriggerPlan;
use crate::store::Schedule;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn hhmm(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour, minute)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn welcome(schedule: &Schedule) -> String {
    let plan = TriggerPlan::from_schedule(schedule);
    format!(
        "Server power manager\n\n\
         Use the buttons to power the server on or off, reboot it or see its status.\n\n\
         Automatic mode:\n\
         - start: {} ({})\n\
         - stop: {}\n\
         - public holidays on working days ask for confirmation\n\n\
         Commands: /check /schedule /settime /setdays /holidays",
        hhmm(plan.start.hour, plan.start.minute),
        schedule.working_day_names().join(", "),
        hhmm(plan.stop.hour, plan.stop.minute),
    )
}

pub fn schedule_view(schedule: &Schedule) -> String {
    let mut text = format!(
        "Working schedule\n\n\
         Days: {}\n\
         Hours: {} - {}\n\
         Server starts {} min before the start",
        schedule.working_day_names().join(", "),
        hhmm(schedule.start_hour, 0),
        hhmm(schedule.end_hour, 0),
        schedule.lead_minutes,
    );

    if let Some(updated) = schedule.last_updated {
        let _ = write!(text, "\nLast changed: {}", updated.format("%Y-%m-%d %H:%M UTC"));
        if let Some(by) = &schedule.updated_by {
            let _ = write!(text, " by {}", by);
        }
    }

    text.push_str("\n\nChange with /settime 9 18 or /setdays 1,2,3,4,5");
    text
}

pub fn schedule_updated(schedule: &Schedule) -> String {
    let plan = TriggerPlan::from_schedule(schedule);
    format!(
        "Schedule updated.\n\n\
         Days: {}\n\
         Hours: {} - {}\n\
         Automatic start at {}, stop at {}",
        schedule.working_day_names().join(", "),
        hhmm(schedule.start_hour, 0),
        hhmm(schedule.end_hour, 0),
        hhmm(plan.start.hour, plan.start.minute),
        hhmm(plan.stop.hour, plan.stop.minute),
    )
}

/// Holidays grouped by month. Markers: `[!]` asks on a weekday, `[w]`
/// public holiday on a weekend, `[ ]` informational.
pub fn holidays_view(holidays: &[UpcomingHoliday]) -> String {
    if holidays.is_empty() {
        return "No holidays in the coming weeks.".to_string();
    }

    let mut text = String::from("Upcoming holidays\n");
    let mut current_month: Option<(i32, u32)> = None;
    let mut shown_in_month = 0;

    for holiday in holidays {
        let month = (holiday.date.year(), holiday.date.month());
        if current_month != Some(month) {
            current_month = Some(month);
            shown_in_month = 0;
            let _ = write!(
                text,
                "\n{} {}:\n",
                MONTH_NAMES[holiday.date.month0() as usize],
                holiday.date.year()
            );
        }

        if shown_in_month >= MAX_HOLIDAYS_PER_MONTH {
            continue;
        }
        shown_in_month += 1;

        let marker = match (holiday.is_public_holiday, holiday.is_weekend) {
            (true, false) => "[!]",
            (true, true) => "[w]",
            _ => "[ ]",
        };
        let _ = writeln!(
            text,
            "{} {} - {}",
            marker,
            holiday.date.format("%d.%m"),
            holiday.name
        );
    }

    text.push_str("\n[!] day off on a weekday (will ask)\n[w] day off on a weekend\n[ ] observance");
    text
}

pub fn server_status(status: &ServerStatus) -> String {
    let mut text = format!(
        "Server: {}\nPower: {}\nIP: {}",
        status.name.as_deref().unwrap_or("unknown"),
        if status.is_powered_on { "on" } else { "off" },
        status.address.as_deref().unwrap_or("-"),
    );
    if let Some(image) = &status.image {
        let _ = write!(text, "\nImage: {}", image);
    }
    if let (Some(cpu), Some(ram), Some(hdd)) = (status.cpu, status.ram, status.hdd) {
        let _ = write!(text, "\nCPU: {}, RAM: {} MB, HDD: {} GB", cpu, ram, hdd);
    }
    if let Some(state) = &status.state {
        let _ = write!(text, "\nState: {}", state);
    }
    text
}

pub fn status_unavailable(error: &RemoteApiError) -> String {
    format!("Could not read server status: {}", error.upstream_message())
}

pub fn check_view(overview: &TodayOverview, status: &Result<ServerStatus, RemoteApiError>) -> String {
    let day = &overview.day;
    let mut text = format!(
        "Today: {} ({})\nHoliday: {}\nWorking day: {}",
        overview.date.format("%d.%m.%Y"),
        overview.now.format("%H:%M"),
        day.holiday_name.as_deref().unwrap_or("no"),
        yes_no(day.is_scheduled_workday && !day.is_weekend),
    );

    if day.needs_confirmation {
        let answer = match &overview.decision {
            Some(stored) => stored.decision.as_str(),
            None if overview.awaiting_confirmation => "waiting for an answer",
            None => "not asked yet",
        };
        let _ = write!(text, "\nHoliday decision: {}", answer);
    }

    text.push_str("\n\n");
    match status {
        Ok(status) => text.push_str(&server_status(status)),
        Err(e) => text.push_str(&status_unavailable(e)),
    }
    text
}
