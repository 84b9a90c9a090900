//! Settable clock for decision tests

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use power_manager::engine::Clock;
use std::sync::Mutex;

pub struct TestClock {
    now: Mutex<DateTime<Tz>>,
}

impl TestClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn now_plus_minutes(&self, minutes: i64) -> DateTime<Tz> {
        Clock::now(self) + Duration::minutes(minutes)
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Tz> {
        *self.now.lock().unwrap()
    }
}
