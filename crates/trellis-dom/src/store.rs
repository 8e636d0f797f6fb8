//! Observable application state

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

type Subscriber = Rc<dyn Fn()>;

struct Shared<S> {
    state: RefCell<S>,
    subscribers: RefCell<Vec<(u64, Subscriber)>>,
    next_id: Cell<u64>,
}

/// Shared state container that notifies subscribers after every change.
///
/// Clones share one state. Subscribers run synchronously, in subscription
/// order, after the state borrow is released, so they may read the store
/// and even change it again.
pub struct Store<S> {
    shared: Rc<Shared<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.shared.state)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<S: Default + 'static> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Store<S> {
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }
}

impl<S: 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(initial),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Copy of the current state.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.shared.state.borrow().clone()
    }

    /// Read the current state without copying it.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.shared.state.borrow())
    }

    /// Replace the state and notify subscribers.
    pub fn set(&self, state: S) {
        *self.shared.state.borrow_mut() = state;
        self.notify();
    }

    /// Change the state in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        f(&mut self.shared.state.borrow_mut());
        self.notify();
    }

    pub fn subscribe(&self, subscriber: impl Fn() + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        self.shared
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));

        let weak: Weak<Shared<S>> = Rc::downgrade(&self.shared);
        Subscription {
            cancel: Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.subscribers.borrow_mut().retain(|(i, _)| *i != id);
                }
            }),
        }
    }

    fn notify(&self) {
        let subscribers: Vec<Subscriber> = self
            .shared
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();
        trace!(subscribers = subscribers.len(), "state changed");
        for subscriber in subscribers {
            subscriber();
        }
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping it keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to end it.
pub struct Subscription {
    cancel: Box<dyn FnOnce()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        (self.cancel)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
