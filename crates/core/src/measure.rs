//! Periodically refreshed telemetry with change notification.
//!
//! A [`Measure`] owns one [`DataSource`] and decides on every
//! [`update`](Measure::update) whether its [`Timer`] allows a query. New
//! values are compared with the cached snapshot and announced through the
//! `changed` signal; `post_update` fires on every call regardless.

use crate::error::Result;
use crate::event::{Signal, Subscription};
use crate::timer::{Cadence, Timer};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, warn};

/// Platform query strategy backing a measure.
///
/// `refresh` advances whatever internal delta state the source keeps (e.g.
/// previous CPU tick counts); `snapshot` reads the current value.
pub trait DataSource {
    type Snapshot: Clone + PartialEq + fmt::Debug + 'static;

    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    fn snapshot(&self) -> Result<Self::Snapshot>;
}

/// Payload of the `post_update` signal.
#[derive(Debug, Clone)]
pub struct Reading<S> {
    /// Instant passed to the update call that produced this reading.
    pub at: Instant,
    /// The source was queried during this call (successfully or not).
    pub refreshed: bool,
    /// `false` once the source has been found unavailable.
    pub enabled: bool,
    /// Latest cached snapshot. Always `None` while disabled.
    pub value: Option<S>,
}

/// Anything the [`Scheduler`](crate::Scheduler) can drive once per frame.
pub trait Update {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    /// Called every frame; does real work only when the measure is due.
    fn update(&mut self, now: Instant);
}

/// A measure shared between the scheduler, the orchestrator and widgets.
pub type Shared<D> = Rc<RefCell<Measure<D>>>;

pub struct Measure<D: DataSource> {
    name: String,
    source: Option<D>,
    timer: Timer,
    reading: Reading<D::Snapshot>,
    changed: Signal<D::Snapshot>,
    post_update: Signal<Reading<D::Snapshot>>,
}

impl<D: DataSource> Measure<D> {
    pub fn new(name: impl Into<String>, source: D, cadence: Cadence, now: Instant) -> Self {
        Self {
            name: name.into(),
            source: Some(source),
            timer: Timer::new(cadence, now),
            reading: Reading {
                at: now,
                refreshed: false,
                enabled: true,
                value: None,
            },
            changed: Signal::new(),
            post_update: Signal::new(),
        }
    }

    /// Build from a fallible source constructor. A failed construction yields
    /// a disabled measure rather than an error.
    pub fn from_init(
        name: impl Into<String>,
        source: Result<D>,
        cadence: Cadence,
        now: Instant,
    ) -> Self {
        let name = name.into();
        match source {
            Ok(source) => Self::new(name, source, cadence, now),
            Err(e) => {
                warn!(measure = %name, "source unavailable, measure disabled: {e}");
                Self {
                    name,
                    source: None,
                    timer: Timer::new(cadence, now),
                    reading: Reading {
                        at: now,
                        refreshed: false,
                        enabled: false,
                        value: None,
                    },
                    changed: Signal::new(),
                    post_update: Signal::new(),
                }
            }
        }
    }

    /// Query the source once right away, outside the cadence.
    ///
    /// An `Every(d)` measure otherwise has no value until `d` has elapsed,
    /// which leaves slow measures (drives, say) blank at startup. The timer is
    /// untouched, so the first scheduled query still happens at `d`.
    #[must_use]
    pub fn primed(mut self) -> Self {
        if self.reading.enabled {
            self.query();
        }
        self
    }

    /// Wrap into the shared handle used by the scheduler and widgets.
    pub fn shared(self) -> Shared<D> {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Widgets must check this before reading values and draw a fallback when `false`.
    pub fn is_enabled(&self) -> bool {
        self.reading.enabled
    }

    /// Latest cached snapshot; `None` before the first query or while disabled.
    pub fn value(&self) -> Option<&D::Snapshot> {
        self.reading.value.as_ref()
    }

    pub fn reading(&self) -> &Reading<D::Snapshot> {
        &self.reading
    }

    pub fn cadence(&self) -> Cadence {
        self.timer.cadence()
    }

    pub fn source(&self) -> Option<&D> {
        self.source.as_ref()
    }

    /// Subscribe to value changes. The callback receives the new snapshot.
    ///
    /// Callbacks run while the measure is mutably borrowed by the scheduler;
    /// they must use the payload rather than borrow the measure again.
    pub fn on_changed(&self, callback: impl FnMut(&D::Snapshot) + 'static) -> Subscription {
        self.changed.subscribe(callback)
    }

    /// Subscribe to the per-update hook, fired after every [`update`](Self::update).
    pub fn on_post_update(
        &self,
        callback: impl FnMut(&Reading<D::Snapshot>) + 'static,
    ) -> Subscription {
        self.post_update.subscribe(callback)
    }

    pub fn update(&mut self, now: Instant) {
        self.reading.at = now;
        self.reading.refreshed = false;

        if self.reading.enabled && self.timer.fire(now) {
            self.reading.refreshed = true;
            self.query();
        }

        self.post_update.emit(&self.reading);
    }

    fn query(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };

        let result = source.refresh().and_then(|()| source.snapshot());
        match result {
            Ok(snapshot) => {
                if self.reading.value.as_ref() == Some(&snapshot) {
                    return;
                }
                debug!(measure = %self.name, ?snapshot, "value changed");
                let value = self.reading.value.insert(snapshot);
                self.changed.emit(value);
            }
            Err(e) if e.is_persistent() => {
                warn!(measure = %self.name, "source lost, measure disabled: {e}");
                self.disable();
            }
            Err(e) => {
                warn!(measure = %self.name, "query failed, keeping previous value: {e}");
            }
        }
    }

    fn disable(&mut self) {
        self.source = None;
        self.reading.enabled = false;
        self.reading.value = None;
    }
}

impl<D: DataSource> Update for Measure<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.reading.enabled
    }

    fn update(&mut self, now: Instant) {
        Measure::update(self, now);
    }
}

impl<D: DataSource> Drop for Measure<D> {
    fn drop(&mut self) {
        debug!(
            measure = %self.name,
            subscribers = self.changed.len() + self.post_update.len(),
            "measure dropped"
        );
    }
}

impl<D: DataSource> fmt::Debug for Measure<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measure")
            .field("name", &self.name)
            .field("cadence", &self.timer.cadence())
            .field("enabled", &self.reading.enabled)
            .field("value", &self.reading.value)
            .finish()
    }
}
