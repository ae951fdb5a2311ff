use std::time::{Duration, Instant};

/// How often a measure queries its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Query whenever at least this much time has passed since the last query.
    Every(Duration),
    /// Query on the first update only (static information).
    Once,
}

impl Cadence {
    /// Interpret a config value in milliseconds; `0` means [`Cadence::Once`].
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Once
        } else {
            Self::Every(Duration::from_millis(ms))
        }
    }
}

/// Elapsed-interval gate.
///
/// Interval timers start counting at construction, so the first firing of
/// `Every(d)` happens `d` after [`Timer::new`].
#[derive(Debug, Clone)]
pub struct Timer {
    cadence: Cadence,
    last: Instant,
    fired: bool,
}

impl Timer {
    pub fn new(cadence: Cadence, now: Instant) -> Self {
        Self {
            cadence,
            last: now,
            fired: false,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// `true` when enough time has elapsed for the next firing.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        match self.cadence {
            Cadence::Once => !self.fired,
            Cadence::Every(interval) => now.saturating_duration_since(self.last) >= interval,
        }
    }

    /// Check and, when due, restart the interval from `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last = now;
        self.fired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_timer_waits_from_construction() {
        let t0 = Instant::now();
        let mut timer = Timer::new(Cadence::Every(Duration::from_secs(1)), t0);

        assert!(!timer.fire(t0 + Duration::from_millis(999)));
        assert!(timer.fire(t0 + Duration::from_secs(1)));
        assert!(!timer.fire(t0 + Duration::from_millis(1500)));
        assert!(timer.fire(t0 + Duration::from_millis(2100)));
    }

    #[test]
    fn once_fires_a_single_time() {
        let t0 = Instant::now();
        let mut timer = Timer::new(Cadence::Once, t0);

        assert!(timer.is_due(t0));
        assert!(timer.fire(t0));
        assert!(!timer.fire(t0 + Duration::from_secs(3600)));
        assert!(!timer.is_due(t0));
    }

    #[test]
    fn zero_millis_means_once() {
        assert_eq!(Cadence::from_millis(0), Cadence::Once);
        assert_eq!(
            Cadence::from_millis(250),
            Cadence::Every(Duration::from_millis(250))
        );
    }
}
