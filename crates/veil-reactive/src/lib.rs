#![forbid(unsafe_code)]

//! Change-notification primitives for Veil.
//!
//! This crate provides the small reactive layer the overlay controller
//! publishes its state through:
//!
//! - [`Observable`]: a shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Binding`]: a read-only, lazily-evaluated view over an observable,
//!   suitable for pull-based render loops.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership; clones of an observable share one cell. Subscribers are held
//! as `Weak` callbacks and cleaned up lazily during notification, so a
//! dropped [`Subscription`] costs nothing until the next change.
//!
//! # Invariants
//!
//! 1. The version increments exactly once per mutation that changes the
//!    value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version
//!    bump, no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. No internal borrow is held while subscriber callbacks run, so a
//!    callback may freely read the observable it subscribed to.

pub mod binding;
pub mod observable;

pub use binding::{Binding, bind_observable};
pub use observable::{Observable, Subscription};
