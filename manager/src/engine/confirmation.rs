use chrono::NaiveDate;
use std::fmt;

use crate::store::Decision;

const RUN_PREFIX: &str = "holiday_yes_";
const SKIP_PREFIX: &str = "holiday_no_";

/// Answer carried by a holiday prompt button: `holiday_yes_<date>` or
/// `holiday_no_<date>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationToken {
    pub date: NaiveDate,
    pub decision: Decision,
}

impl ConfirmationToken {
    pub fn new(date: NaiveDate, decision: Decision) -> Self {
        Self { date, decision }
    }

    pub fn parse(token: &str) -> Option<Self> {
        let (decision, date) = if let Some(date) = token.strip_prefix(RUN_PREFIX) {
            (Decision::Run, date)
        } else if let Some(date) = token.strip_prefix(SKIP_PREFIX) {
            (Decision::Skip, date)
        } else {
            return None;
        };

        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|date| Self { date, decision })
    }
}

impl fmt::Display for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.decision {
            Decision::Run => RUN_PREFIX,
            Decision::Skip => SKIP_PREFIX,
        };
        write!(f, "{}{}", prefix, self.date.format("%Y-%m-%d"))
    }
}
