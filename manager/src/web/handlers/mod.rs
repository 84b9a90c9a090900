//! HTTP request handlers for the power manager API.
//!
//! This module is organized by domain:
//! - `common` - Response wrapper, query and body types
//! - `operations` - On-demand checks and manual power operations
//! - `schedule` - Schedule read and update
//! - `status` - Today's status, holidays and stored decisions

pub mod common;
pub mod operations;
pub mod schedule;
pub mod status;

pub use operations::*;
pub use schedule::*;
pub use status::*;
