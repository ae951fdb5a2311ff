//! Typed publish/subscribe used to decouple measures, widgets and config.
//!
//! A [`Signal`] owns its subscriber list; [`Signal::subscribe`] hands back a
//! [`Subscription`] token that unsubscribes when dropped. Everything here is
//! single-threaded: producers and consumers run on the update thread in a
//! strict call → callback sequence.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Slot<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Slots<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Slot<T>)>,
}

/// A list of callbacks invoked with a borrowed payload on every [`emit`](Signal::emit).
pub struct Signal<T: ?Sized> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T: ?Sized + 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register `callback`. It stays attached for as long as the returned token lives.
    #[must_use = "dropping the subscription detaches the callback immediately"]
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let slot: Slot<T> = Rc::new(RefCell::new(callback));
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;
        slots.entries.push((id, slot));
        drop(slots);

        let weak: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.slots);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().entries.retain(|(slot_id, _)| *slot_id != id);
                }
            })),
        }
    }

    /// Invoke every attached callback with `value`, in subscription order.
    ///
    /// Callbacks may subscribe or drop tokens while the signal is firing; the
    /// change takes effect from the next emit. A callback that re-enters its
    /// own signal is skipped for the nested emit.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Slot<T>> = self
            .slots
            .borrow()
            .entries
            .iter()
            .map(|(_, slot)| Rc::clone(slot))
            .collect();

        for slot in snapshot {
            if let Ok(mut callback) = slot.try_borrow_mut() {
                (&mut *callback)(value);
            }
        }
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.slots.borrow().entries.len())
            .finish()
    }
}

/// RAII token returned by [`Signal::subscribe`].
///
/// Outliving the signal is fine; detaching then becomes a no-op.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the callback attached for the rest of the signal's life.
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_every_subscriber_in_order() {
        let signal = Signal::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = {
            let seen = Rc::clone(&seen);
            signal.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
        };
        let b = {
            let seen = Rc::clone(&seen);
            signal.subscribe(move |v| seen.borrow_mut().push(("b", *v)))
        };

        signal.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
        drop((a, b));
    }

    #[test]
    fn dropping_token_unsubscribes() {
        let signal = Signal::<u32>::new();
        let hits = Rc::new(Cell::new(0));

        let token = {
            let hits = Rc::clone(&hits);
            signal.subscribe(move |_| hits.set(hits.get() + 1))
        };
        signal.emit(&1);
        assert_eq!(signal.len(), 1);

        drop(token);
        signal.emit(&2);
        assert_eq!(hits.get(), 1);
        assert!(signal.is_empty());
    }

    #[test]
    fn token_may_outlive_signal() {
        let signal = Signal::<str>::new();
        let token = signal.subscribe(|_| {});
        drop(signal);
        drop(token);
    }

    #[test]
    fn forget_keeps_callback_attached() {
        let signal = Signal::<u32>::new();
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            signal.subscribe(move |_| hits.set(hits.get() + 1)).forget();
        }
        signal.emit(&0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscriber_can_detach_itself_while_firing() {
        let signal = Signal::<u32>::new();
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));

        let token = {
            let holder = Rc::clone(&holder);
            let hits = Rc::clone(&hits);
            signal.subscribe(move |_| {
                hits.set(hits.get() + 1);
                holder.borrow_mut().take();
            })
        };
        *holder.borrow_mut() = Some(token);

        signal.emit(&1);
        signal.emit(&2);
        assert_eq!(hits.get(), 1);
    }
}
