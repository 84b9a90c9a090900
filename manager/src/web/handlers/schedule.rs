// Schedule read and update endpoints

use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::info;

use super::common::{schedule_error, ApiResponse, ApiResult, HoursUpdate, WorkdaysUpdate};
use crate::scheduler::TriggerPlan;
use crate::store::Schedule;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct ScheduleView {
    pub schedule: Schedule,
    pub working_day_names: Vec<&'static str>,
    pub triggers: TriggerPlan,
}

impl From<Schedule> for ScheduleView {
    fn from(schedule: Schedule) -> Self {
        Self {
            working_day_names: schedule.working_day_names(),
            triggers: TriggerPlan::from_schedule(&schedule),
            schedule,
        }
    }
}

pub async fn get_schedule(State(state): State<AppState>) -> ApiResult<ScheduleView> {
    let schedule = state.engine.schedule_store().current().await;
    Ok(Json(ApiResponse::success(schedule.into())))
}

pub async fn update_schedule_hours(
    State(state): State<AppState>,
    Json(body): Json<HoursUpdate>,
) -> ApiResult<ScheduleView> {
    info!(
        "Schedule hours update requested: {}-{}",
        body.start_hour, body.end_hour
    );

    let schedule = state
        .engine
        .schedule_store()
        .set_hours(body.start_hour, body.end_hour, body.updated_by.as_deref())
        .await
        .map_err(schedule_error)?;

    Ok(Json(ApiResponse::success(schedule.into())))
}

pub async fn update_schedule_workdays(
    State(state): State<AppState>,
    Json(body): Json<WorkdaysUpdate>,
) -> ApiResult<ScheduleView> {
    info!("Schedule workdays update requested: {:?}", body.days);

    let schedule = state
        .engine
        .schedule_store()
        .set_workdays(&body.days, body.updated_by.as_deref())
        .await
        .map_err(schedule_error)?;

    Ok(Json(ApiResponse::success(schedule.into())))
}
