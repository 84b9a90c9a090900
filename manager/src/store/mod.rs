//! File-backed state shared between invocations
//!
//! Two JSON files under `data_dir` are the only mutable state shared by the
//! short-lived check processes and the long-lived listener:
//!
//! - `schedule_config.json`: the weekly schedule (cached per process)
//! - `holiday_decisions.json`: per-date holiday answers (never cached)
//!
//! Every write replaces the whole file through a temp file and a rename, so
//! readers never observe a half-written document. Read-modify-write is
//! serialized inside a process only; two processes writing at the same moment
//! can still lose one update. Checks are launched minutes apart, so this race
//! is accepted rather than locked.

pub mod decisions;
pub mod schedule;

pub use decisions::{Decision, DecisionStore, HolidayDecision, RecordOutcome};
pub use schedule::{Schedule, ScheduleStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;

use crate::errors::PersistenceError;

pub const SCHEDULE_FILE: &str = "schedule_config.json";
pub const DECISIONS_FILE: &str = "holiday_decisions.json";

/// Read and parse a JSON file; `Ok(None)` when it does not exist
pub(crate) async fn read_json<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, PersistenceError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PersistenceError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| PersistenceError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Replace a JSON file as a whole
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let write_failed = |reason: String| PersistenceError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
    }

    let content = serde_json::to_string_pretty(value).map_err(|e| write_failed(e.to_string()))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)
        .await
        .map_err(|e| write_failed(e.to_string()))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| write_failed(e.to_string()))?;

    Ok(())
}
