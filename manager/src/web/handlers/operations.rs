// On-demand checks and manual power operations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use super::common::{api_error, ApiResponse, ApiResult};
use crate::engine::{CheckOutcome, StopOutcome};
use crate::power::{PowerAction, ToggleOutcome};
use crate::web::AppState;

/// Run the morning decision now and wait for its result
pub async fn run_start_check(State(state): State<AppState>) -> ApiResult<CheckOutcome> {
    info!("On-demand start check requested");

    state
        .operation_tracker
        .try_start("start_check", Some("api".to_string()))
        .await
        .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;

    let outcome = state.engine.decide_for_today().await;
    state.operation_tracker.finish().await;

    info!("On-demand start check finished: {}", outcome);
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn run_stop_check(State(state): State<AppState>) -> ApiResult<StopOutcome> {
    info!("On-demand stop check requested");

    state
        .operation_tracker
        .try_start("stop_check", Some("api".to_string()))
        .await
        .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;

    let outcome = state.engine.decide_stop().await;
    state.operation_tracker.finish().await;

    info!("On-demand stop check finished: {}", outcome);
    Ok(Json(ApiResponse::success(outcome)))
}

/// Start an interactive power toggle in the background. Progress is
/// reported to the chat; the response only confirms the start.
pub async fn execute_power_action(
    Path(action): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    let action: PowerAction = action
        .parse()
        .map_err(|e: String| api_error(StatusCode::BAD_REQUEST, e))?;

    info!("Manual {} requested via API", action);

    state
        .operation_tracker
        .try_start(&action.to_string(), Some("api".to_string()))
        .await
        .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;

    let operation_id = Uuid::new_v4().to_string();
    let engine = state.engine.clone();
    let tracker = state.operation_tracker.clone();
    let id = operation_id.clone();

    tokio::spawn(async move {
        let outcome = engine.sequencer().toggle(action, None).await;
        tracker.finish().await;
        match outcome {
            ToggleOutcome::Completed => info!("✓ Operation {} ({}) completed", id, action),
            ToggleOutcome::TimedOut => error!("✗ Operation {} ({}) timed out", id, action),
            ToggleOutcome::Failed(reason) => {
                error!("✗ Operation {} ({}) failed: {}", id, action, reason)
            }
        }
    });

    Ok(Json(ApiResponse::success(json!({
        "message": format!("Server {} started", action),
        "operation_id": operation_id,
        "action": action,
        "status": "started"
    }))))
}
