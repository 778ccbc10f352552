//! Single-threaded listener plumbing.
//!
//! A [`Signal`] fans a value out to every connected callback. Connecting returns a
//! [`Subscription`]; dropping the handle (or calling [`Subscription::unsubscribe`])
//! removes the callback again, so register/unregister pairs stay symmetric.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Slots<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<T>)>>,
}

impl<T> Slots<T> {
    fn contains(&self, id: u64) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry, _)| *entry != id);
    }
}

/// A multi-listener notification channel for one value type.
pub struct Signal<T> {
    slots: Rc<Slots<T>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(Slots {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register `callback`. It stays registered for as long as the returned
    /// handle is alive.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.slots.next_id.get();
        self.slots.next_id.set(id + 1);
        self.slots
            .entries
            .borrow_mut()
            .push((id, Rc::new(callback)));

        let slots: Weak<Slots<T>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = slots.upgrade() {
                slots.remove(id);
            }
        })
    }

    /// Deliver `value` to every callback registered when the emission starts.
    ///
    /// Callbacks may connect or disconnect listeners while running. A callback
    /// removed by an earlier one in the same emission is not called.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<(u64, Callback<T>)> = self.slots.entries.borrow().clone();
        for (id, callback) in snapshot {
            if self.slots.contains(id) {
                callback(value);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.slots.entries.borrow().len()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.slots.entries.borrow().len())
            .finish()
    }
}

/// Handle for a registered listener.
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an arbitrary unregister action, for adapters around toolkit listeners.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unregister now. Equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
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
