//! Explicit, disposable change subscriptions
//!
//! Listeners are registered on an [`Observers`] list and stay registered for
//! exactly as long as the returned [`Subscription`] is alive. Everything here
//! is single-threaded (`Rc`/`RefCell`); editors run on the UI thread only.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<dyn Fn(&E)>;

/// A list of listeners for events of type `E`
pub struct Observers<E> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener<E>)>>,
}

impl<E: 'static> Observers<E> {
    /// Create an empty, shareable listener list
    pub fn new() -> Rc<Self> {
        Rc::new(Observers {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Register a listener; it is removed when the subscription is dropped
    pub fn subscribe(self: &Rc<Self>, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));

        let weak: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(observers) = weak.upgrade() {
                observers.unsubscribe(id);
            }
        })
    }

    /// Deliver an event to every listener registered at call time
    pub fn notify(&self, event: &E) {
        // Snapshot so listeners can subscribe or dispose while being notified
        let listeners: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Handle that keeps one listener registered (RAII-style release)
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Subscription {
            release: Some(Box::new(release)),
        }
    }

    /// Release the listener now
    pub fn dispose(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
