//! Custom error types for the power manager
//!
//! Provides structured error handling for the failure classes the core has to
//! tell apart: remote power API failures (surfaced to the operator verbatim),
//! persistence failures (recovered locally), notification failures
//! (best-effort, never change a decision) and rejected schedule updates.

use std::fmt;

/// Configuration error variants
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },
}

/// Remote power API error variants
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteApiError {
    /// The request never produced a response (connect error, timeout)
    RequestFailed { operation: String, reason: String },

    /// The API answered with a non-success status
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },

    /// The response body could not be understood
    InvalidResponse { operation: String, reason: String },
}

impl RemoteApiError {
    /// Raw upstream text, as shown to the operator
    pub fn upstream_message(&self) -> &str {
        match self {
            RemoteApiError::RequestFailed { reason, .. } => reason,
            RemoteApiError::Rejected { message, .. } => message,
            RemoteApiError::InvalidResponse { reason, .. } => reason,
        }
    }
}

/// Persistence error variants
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// File could not be read
    ReadFailed { path: String, reason: String },

    /// File content could not be parsed
    ParseFailed { path: String, reason: String },

    /// File could not be written or replaced
    WriteFailed { path: String, reason: String },
}

/// Notification error variants
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Request to the chat API failed
    RequestFailed { method: String, reason: String },

    /// Chat API answered `ok: false`
    ApiError { method: String, description: String },
}

/// Schedule update rejection variants
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Hour outside 0..=23
    HourOutOfRange { field: String, value: u32 },

    /// Start hour is not strictly before end hour
    StartNotBeforeEnd { start_hour: u32, end_hour: u32 },

    /// No valid weekday left after filtering
    NoWorkdays,

    /// Lead time larger than allowed
    LeadTooLarge { minutes: u32, max: u32 },

    /// The updated schedule could not be persisted
    Persistence(PersistenceError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteApiError::RequestFailed { operation, reason } => {
                write!(f, "Request '{}' failed: {}", operation, reason)
            }
            RemoteApiError::Rejected {
                operation,
                status,
                message,
            } => {
                write!(
                    f,
                    "Request '{}' rejected with status {}: {}",
                    operation, status, message
                )
            }
            RemoteApiError::InvalidResponse { operation, reason } => {
                write!(f, "Invalid response to '{}': {}", operation, reason)
            }
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::ReadFailed { path, reason } => {
                write!(f, "Failed to read '{}': {}", path, reason)
            }
            PersistenceError::ParseFailed { path, reason } => {
                write!(f, "Failed to parse '{}': {}", path, reason)
            }
            PersistenceError::WriteFailed { path, reason } => {
                write!(f, "Failed to write '{}': {}", path, reason)
            }
        }
    }
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::RequestFailed { method, reason } => {
                write!(f, "Chat API call '{}' failed: {}", method, reason)
            }
            NotificationError::ApiError {
                method,
                description,
            } => {
                write!(f, "Chat API call '{}' returned error: {}", method, description)
            }
        }
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::HourOutOfRange { field, value } => {
                write!(f, "{} must be between 0 and 23, got {}", field, value)
            }
            ScheduleError::StartNotBeforeEnd {
                start_hour,
                end_hour,
            } => {
                write!(
                    f,
                    "Start hour ({}) must be earlier than end hour ({})",
                    start_hour, end_hour
                )
            }
            ScheduleError::NoWorkdays => {
                write!(f, "At least one weekday between 0 (Sun) and 6 (Sat) is required")
            }
            ScheduleError::LeadTooLarge { minutes, max } => {
                write!(f, "Lead time of {} minutes exceeds the maximum of {}", minutes, max)
            }
            ScheduleError::Persistence(e) => write!(f, "Schedule not saved: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for RemoteApiError {}
impl std::error::Error for PersistenceError {}
impl std::error::Error for NotificationError {}
impl std::error::Error for ScheduleError {}

impl From<PersistenceError> for ScheduleError {
    fn from(err: PersistenceError) -> Self {
        ScheduleError::Persistence(err)
    }
}
