pub mod app;
pub mod bot;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod notify;
pub mod operation_tracker;
pub mod power;
pub mod scheduler;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use engine::{CheckAction, CheckOutcome, DecisionEngine, StopOutcome};
pub use notify::Notifier;
pub use operation_tracker::PowerOperationTracker;
pub use power::{PowerController, PowerSequencer};
pub use store::{DecisionStore, ScheduleStore};
