use chrono::{Local, Timelike};
use dash_core::snapshot::TimeSnapshot;
use dash_core::{DataSource, Result};

/// Local wall-clock time at one-second resolution, so a measure ticking
/// faster than once a second only reports a change when the second flips.
pub struct TimeSource {
    current: TimeSnapshot,
}

impl TimeSource {
    pub fn new() -> Self {
        Self {
            current: TimeSnapshot { now: now_seconds() },
        }
    }
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::new()
    }
}

fn now_seconds() -> chrono::DateTime<Local> {
    let now = Local::now();
    now.with_nanosecond(0).unwrap_or(now)
}

impl DataSource for TimeSource {
    type Snapshot = TimeSnapshot;

    fn refresh(&mut self) -> Result<()> {
        self.current = TimeSnapshot { now: now_seconds() };
        Ok(())
    }

    fn snapshot(&self) -> Result<TimeSnapshot> {
        Ok(self.current)
    }
}
