use crate::measure::Update;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, warn};

/// Cooperative single-threaded driver: every frame each measure gets one
/// [`Update::update`] call and decides for itself whether to do work.
///
/// Measures are visited in registration order, but no measure may rely on
/// another having updated first.
#[derive(Default)]
pub struct Scheduler {
    measures: Vec<Rc<RefCell<dyn Update>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<U: Update + 'static>(&mut self, measure: Rc<RefCell<U>>) {
        info!(measure = measure.borrow().name(), "measure registered");
        self.measures.push(measure);
    }

    /// Drive every registered measure once.
    pub fn tick(&self, now: Instant) {
        for measure in &self.measures {
            match measure.try_borrow_mut() {
                Ok(mut measure) => measure.update(now),
                // Only possible if a callback re-entered the scheduler.
                Err(_) => warn!("measure busy, skipping this frame"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Names of measures whose source turned out to be unavailable.
    pub fn disabled(&self) -> Vec<String> {
        self.measures
            .iter()
            .filter_map(|m| {
                let m = m.borrow();
                (!m.is_enabled()).then(|| m.name().to_string())
            })
            .collect()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("measures", &self.measures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FakeMeasure {
        name: &'static str,
        enabled: bool,
        calls: Vec<Instant>,
    }

    impl Update for FakeMeasure {
        fn name(&self) -> &str {
            self.name
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn update(&mut self, now: Instant) {
            self.calls.push(now);
        }
    }

    fn fake(name: &'static str, enabled: bool) -> Rc<RefCell<FakeMeasure>> {
        Rc::new(RefCell::new(FakeMeasure {
            name,
            enabled,
            calls: Vec::new(),
        }))
    }

    #[test]
    fn tick_updates_every_measure_once() {
        let a = fake("a", true);
        let b = fake("b", false);

        let mut scheduler = Scheduler::new();
        scheduler.add(Rc::clone(&a));
        scheduler.add(Rc::clone(&b));
        assert_eq!(scheduler.len(), 2);

        let t0 = Instant::now();
        scheduler.tick(t0);
        scheduler.tick(t0 + Duration::from_millis(33));

        assert_eq!(a.borrow().calls.len(), 2);
        assert_eq!(b.borrow().calls, vec![t0, t0 + Duration::from_millis(33)]);
        assert_eq!(scheduler.disabled(), vec!["b".to_string()]);
    }

    #[test]
    fn borrowed_measure_is_skipped() {
        let a = fake("a", true);
        let mut scheduler = Scheduler::new();
        scheduler.add(Rc::clone(&a));

        let guard = a.borrow();
        scheduler.tick(Instant::now());
        drop(guard);

        assert!(a.borrow().calls.is_empty());
    }
}
