// File: manager/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::engine::DecisionEngine;
use crate::operation_tracker::PowerOperationTracker;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
    pub operation_tracker: PowerOperationTracker,
}

impl AppState {
    pub fn new(engine: Arc<DecisionEngine>, operation_tracker: PowerOperationTracker) -> Self {
        Self {
            engine,
            operation_tracker,
        }
    }
}
