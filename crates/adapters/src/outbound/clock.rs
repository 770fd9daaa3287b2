//! Time adapters.

use application::ports::outbound::Clock;
use chrono::{DateTime, Utc};

/// System clock using the OS time.
#[derive(Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
