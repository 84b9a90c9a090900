// File: manager/src/web/server.rs
use crate::config::WebConfig;
use crate::web::{handlers, AppState};
use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

pub async fn start_web_server(
    web: &WebConfig,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", web.host, web.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP API on {}", addr))?;
    tracing::info!("HTTP API running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === STATUS ROUTES ===
        .route("/api/status", get(handlers::get_status))
        .route("/api/holidays", get(handlers::get_upcoming_holidays))
        .route("/api/decisions", get(handlers::get_decisions))
        // === SCHEDULE ROUTES ===
        .route("/api/schedule", get(handlers::get_schedule))
        .route("/api/schedule/hours", put(handlers::update_schedule_hours))
        .route(
            "/api/schedule/workdays",
            put(handlers::update_schedule_workdays),
        )
        // === MANUAL OPERATION ROUTES (WITH OPERATION TRACKING) ===
        .route("/api/checks/start", post(handlers::run_start_check))
        .route("/api/checks/stop", post(handlers::run_stop_check))
        .route("/api/server/{action}", post(handlers::execute_power_action))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
