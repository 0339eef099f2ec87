#![forbid(unsafe_code)]

//! Core overlay-control state machine for Veil.
//!
//! This crate owns the part of an overlay interaction that has real
//! invariants: the single-open-per-controller lifecycle, the
//! exactly-once settlement contract between `open`, `resolve`, and
//! `dismiss`, coalescing of concurrent `open` calls, forced dismissal on
//! scope teardown, and the focus-restoration policy applied at
//! settlement. Rendering the overlay itself is the view layer's job; it
//! collaborates with the controller only through `is_open` and the
//! settlement methods.
//!
//! - [`OverlayController`]: the state machine.
//! - [`OutcomeHandle`]: the awaitable, multi-consumer result of `open`.
//! - [`Outcome`] / [`DismissReason`]: the settled result.
//! - [`FocusHost`] / [`RestoreFocus`]: the focus-restoration seam.
//!
//! Everything is single-threaded and cooperative (`Rc`-backed, `!Send`);
//! no operation blocks, and none of the core operations can fail.

pub mod controller;
pub mod focus;
pub mod handle;
pub mod outcome;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use controller::{OpenOptions, OverlayConfig, OverlayController};
pub use focus::{FocusHost, RestoreFocus};
pub use handle::OutcomeHandle;
pub use outcome::{DismissReason, Outcome};
