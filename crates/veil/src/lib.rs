#![forbid(unsafe_code)]

//! Veil: await a user-dismissible overlay's outcome from imperative code.
//!
//! A caller opens an overlay and awaits a single [`Outcome`]; a decoupled
//! view layer renders it by observing the controller's open flag and
//! settles it with [`OverlayController::resolve`] or
//! [`OverlayController::dismiss`] when the user acts. See `veil-core` for
//! the state machine and `veil-reactive` for the observable primitives.
//!
//! # Example
//!
//! ```ignore
//! use veil::{OverlayController, RestoreFocus};
//!
//! let dialog: OverlayController<bool, String, _> = OverlayController::new(host);
//!
//! // Imperative caller:
//! match dialog.open_from(delete_button).await {
//!     outcome if outcome.is_resolved() => delete_the_file(),
//!     _ => {} // dismissed, nothing to do
//! }
//! ```

pub use veil_core::{
    DismissReason, FocusHost, OpenOptions, Outcome, OutcomeHandle, OverlayConfig,
    OverlayController, RestoreFocus,
};

pub use veil_reactive as reactive;

#[cfg(feature = "test-helpers")]
pub use veil_core::testing;
