// Read-only status endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

use super::common::{api_error, ApiResponse, ApiResult, HolidaysQuery};
use crate::calendar::UpcomingHoliday;
use crate::engine::TodayOverview;
use crate::operation_tracker::ActiveOperation;
use crate::power::ServerStatus;
use crate::store::HolidayDecision;
use crate::web::AppState;

const MAX_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub today: TodayOverview,
    pub server: Option<ServerStatus>,
    pub server_error: Option<String>,
    pub active_operation: Option<ActiveOperation>,
}

/// Today's classification plus a fresh power-state poll
pub async fn get_status(State(state): State<AppState>) -> ApiResult<StatusView> {
    let today = state.engine.today_overview().await;
    let (server, server_error) = match state.engine.sequencer().status().await {
        Ok(status) => (Some(status), None),
        Err(e) => (None, Some(e.upstream_message().to_string())),
    };

    Ok(Json(ApiResponse::success(StatusView {
        today,
        server,
        server_error,
        active_operation: state.operation_tracker.current().await,
    })))
}

pub async fn get_upcoming_holidays(
    Query(query): Query<HolidaysQuery>,
    State(state): State<AppState>,
) -> ApiResult<Vec<UpcomingHoliday>> {
    if query.days == 0 || query.days > MAX_WINDOW_DAYS {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("days must be between 1 and {}", MAX_WINDOW_DAYS),
        ));
    }

    Ok(Json(ApiResponse::success(
        state.engine.upcoming_holidays(query.days),
    )))
}

pub async fn get_decisions(
    State(state): State<AppState>,
) -> ApiResult<BTreeMap<String, HolidayDecision>> {
    let decisions = state.engine.decision_store().load_all().await;
    Ok(Json(ApiResponse::success(decisions)))
}
