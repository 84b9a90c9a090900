//! This module provides reusable test utilities:
//! - In-memory stand-ins for the power API, chat and trigger seams
//! - A settable clock in the business timezone
//! - Mock HTTP servers for the cloud API and the Bot API
//! - A temp-dir environment that wires a full `DecisionEngine`

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod memory_notifier;
pub mod mock_cloud_api;
pub mod mock_power;
pub mod mock_telegram;
pub mod recording_session;
pub mod recording_trigger;
pub mod test_clock;
pub mod test_data;
pub mod test_env;

// Re-export commonly used items
pub use memory_notifier::MemoryNotifier;
pub use mock_cloud_api::MockCloudApi;
pub use mock_power::MockPower;
pub use mock_telegram::MockTelegramApi;
pub use recording_session::RecordingSession;
pub use recording_trigger::RecordingTrigger;
pub use test_clock::TestClock;
pub use test_data::*;
pub use test_env::TestEnv;
