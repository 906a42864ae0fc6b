//! Synchronous single-threaded notification channels.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier handed out by [`Signal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

type Handler<T> = Rc<dyn Fn(&T)>;

struct Slots<T> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, Handler<T>)>>,
}

/// Multicast channel invoking every listener before `emit` returns.
///
/// Listeners run in subscription order. The listener list is snapshotted at
/// the start of an emission, so listeners may subscribe, unsubscribe, or read
/// the emitting object from inside a callback.
pub struct Signal<T> {
    slots: Rc<Slots<T>>,
}

impl<T: 'static> Signal<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Rc::new(Slots {
                next_id: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.slots.next_id.get());
        self.slots.next_id.set(id.0 + 1);
        let handler: Handler<T> = Rc::new(handler);
        self.slots.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Subscribe for as long as the returned guard is alive.
    pub fn subscribe_scoped(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = self.subscribe(handler);
        let slots: Weak<Slots<T>> = Rc::downgrade(&self.slots);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(slots) = slots.upgrade() {
                    slots.handlers.borrow_mut().retain(|(slot, _)| *slot != id);
                }
            })),
        }
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.slots.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(slot, _)| *slot != id);
        handlers.len() != before
    }

    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<Handler<T>> = self
            .slots
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(payload);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.slots.handlers.borrow().len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.slots.handlers.borrow().len())
            .finish()
    }
}

/// Scoped subscription; unsubscribes when dropped or disconnected.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn disconnect(mut self) {
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
