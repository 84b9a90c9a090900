//! Chat command layer
//!
//! - `commands`: parsing of slash commands and button payloads
//! - `render`: plain-text views
//! - `handlers`: routing into the engine, sequencer and schedule store
//! - `listener`: the long-poll loop of the resident process

pub mod commands;
pub mod handlers;
pub mod listener;
pub mod render;

pub use commands::{BotCommand, CallbackAction};
pub use handlers::{BotHandler, HandleResult, Sender};
pub use listener::ChatListener;
