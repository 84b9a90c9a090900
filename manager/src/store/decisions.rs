use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::{read_json, write_json};
use crate::errors::PersistenceError;

/// Operator answer for a holiday that falls on a working day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[serde(alias = "yes")]
    Run,
    #[serde(alias = "no")]
    Skip,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Run => "run",
            Decision::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayDecision {
    pub decision: Decision,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First answer for the date, now persisted
    Recorded(HolidayDecision),
    /// The date was already decided; the stored answer is returned untouched
    AlreadyDecided(HolidayDecision),
}

impl RecordOutcome {
    /// The decision now in force for the date
    pub fn decision(&self) -> Decision {
        match self {
            RecordOutcome::Recorded(d) | RecordOutcome::AlreadyDecided(d) => d.decision,
        }
    }
}

/// Date key used in the decisions file
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Per-date holiday decisions. Reads always go to disk so answers written by
/// another process are seen immediately.
pub struct DecisionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DecisionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Full mapping; an unreadable file counts as empty
    pub async fn load_all(&self) -> BTreeMap<String, HolidayDecision> {
        match read_json::<BTreeMap<String, HolidayDecision>>(&self.path).await {
            Ok(Some(decisions)) => decisions,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                error!("Failed to load holiday decisions: {} - treating as empty", e);
                BTreeMap::new()
            }
        }
    }

    pub async fn get(&self, date: NaiveDate) -> Option<HolidayDecision> {
        self.load_all().await.remove(&date_key(date))
    }

    /// Persist the first answer for `date`. Later answers leave the stored
    /// record as it is.
    pub async fn record(
        &self,
        date: NaiveDate,
        decision: Decision,
    ) -> Result<RecordOutcome, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let key = date_key(date);

        let mut decisions = self.load_all().await;
        if let Some(existing) = decisions.get(&key) {
            if existing.decision != decision {
                warn!(
                    "Ignoring '{}' for {}: already decided '{}' at {}",
                    decision.as_str(),
                    key,
                    existing.decision.as_str(),
                    existing.timestamp
                );
            }
            return Ok(RecordOutcome::AlreadyDecided(existing.clone()));
        }

        let record = HolidayDecision {
            decision,
            timestamp: Utc::now(),
        };
        decisions.insert(key.clone(), record.clone());
        write_json(&self.path, &decisions).await?;

        info!("Saved holiday decision for {}: {}", key, decision.as_str());
        Ok(RecordOutcome::Recorded(record))
    }
}
