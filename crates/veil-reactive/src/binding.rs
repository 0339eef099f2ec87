#![forbid(unsafe_code)]

//! Read-only bindings over [`Observable`] values.
//!
//! A [`Binding<T>`] packages "how to read the current value" behind a
//! cloneable handle, hiding the mutable side of an observable from code
//! that should only ever read it (a render loop, for example). Evaluation
//! is lazy: the source is read on every [`Binding::get`] call, so a binding
//! never returns a stale value.
//!
//! # Invariants
//!
//! 1. `get()` always reflects the source's current value.
//! 2. A binding's transform runs on every `get()` (no caching).
//! 3. Bindings are `Clone`; clones read the same source.

use std::rc::Rc;

use crate::observable::Observable;

/// A read-only view producing `T` on demand.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .finish()
    }
}

impl<T: 'static> Binding<T> {
    /// Create a binding that evaluates `f` on each `get()` call.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// Read the current bound value.
    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }

    /// Apply a further transform, returning a new `Binding`.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        Binding {
            eval: Rc::new(move || f((self.eval)())),
        }
    }
}

/// Create a direct binding to an observable (identity transform).
pub fn bind_observable<T: Clone + 'static>(source: &Observable<T>) -> Binding<T> {
    let source = source.clone();
    Binding {
        eval: Rc::new(move || source.get()),
    }
}
