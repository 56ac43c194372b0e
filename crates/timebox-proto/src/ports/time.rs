use std::fmt;

use chrono::{DateTime, Local};

/// Source of wall-clock readings.
pub trait TimeSource: Send + Sync + fmt::Debug {
    /// Current moment in the local time zone.
    fn now(&self) -> DateTime<Local>;
}

/// [`TimeSource`] backed by the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
