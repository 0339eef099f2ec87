#![forbid(unsafe_code)]

//! Shared, version-tracked value cell with change notification.
//!
//! An [`Observable`] owns a value behind `Rc<RefCell<..>>`; clones share
//! the cell. [`Observable::set`] notifies subscribers only when the value
//! actually changed, and bumps an internal version counter that callers can
//! use for cheap dirty-checking.
//!
//! # Failure Modes
//!
//! - A subscriber callback that panics propagates to the caller of `set`.
//! - Subscribing from within a notification callback takes effect on the
//!   next change, not the in-flight one.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared value that notifies subscribers when it changes.
///
/// Cloning an `Observable` produces another handle to the same cell, so a
/// controller can keep one handle and hand clones to collaborators.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T> Observable<T> {
    /// Create an observable holding `value` at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Read the current value through a closure, without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// The number of mutations that changed the value so far.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register a callback invoked with the new value after each change.
    ///
    /// The callback stays registered for the lifetime of the returned
    /// [`Subscription`]; dropping the guard unsubscribes.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription
    where
        T: 'static,
    {
        let callback: Rc<Callback<T>> = Rc::new(Box::new(f));
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription { _keep: callback }
    }

    /// Number of live subscribers (dead ones are pruned lazily).
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl<T: Clone> Observable<T> {
    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Set the value, notifying subscribers if it changed.
    ///
    /// Setting a value equal to the current one is a complete no-op: no
    /// version bump, no notifications. Notification happens with no
    /// internal borrow held, so callbacks may read the observable.
    pub fn set(&self, value: T) {
        let live = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value.clone();
            inner.version += 1;
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>()
        };
        for callback in live {
            (*callback)(&value);
        }
    }
}

/// RAII guard for an [`Observable`] subscription.
///
/// The callback is removed before the next notification cycle once this
/// guard is dropped.
pub struct Subscription {
    _keep: Rc<dyn Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl Subscription {
    /// Explicitly unsubscribe (equivalent to dropping the guard).
    pub fn unsubscribe(self) {}
}
