// Common types and utilities for API handlers

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::calendar::UPCOMING_WINDOW_DAYS;
use crate::errors::ScheduleError;

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub fn api_error(status: StatusCode, message: String) -> (StatusCode, Json<ApiResponse<()>>) {
    (status, Json(ApiResponse::error(message)))
}

/// Validation failures are the caller's fault; a failed write is ours
pub fn schedule_error(e: ScheduleError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = match e {
        ScheduleError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    api_error(status, e.to_string())
}

// Query parameters
#[derive(Deserialize)]
pub struct HolidaysQuery {
    #[serde(default = "default_window_days")]
    pub days: u32,
}

fn default_window_days() -> u32 {
    UPCOMING_WINDOW_DAYS
}

// Request bodies
#[derive(Deserialize)]
pub struct HoursUpdate {
    pub start_hour: u32,
    pub end_hour: u32,
    pub updated_by: Option<String>,
}

#[derive(Deserialize)]
pub struct WorkdaysUpdate {
    pub days: Vec<u8>,
    pub updated_by: Option<String>,
}
