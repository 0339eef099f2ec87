#![forbid(unsafe_code)]

//! Focus-restoration policy and the host seam it resolves through.
//!
//! The controller never manages visual focus itself; it only decides, at
//! settlement time, *which* element should get focus back, and asks the
//! embedding environment to perform the handoff. Both halves of that
//! environment contract ([`FocusHost::find`] and [`FocusHost::focus`]) are
//! best-effort: a selector that matches nothing or an element that cannot
//! accept focus is silently skipped, never surfaced to the caller.

use std::fmt;
use std::rc::Rc;

/// The embedding environment's view of focusable elements.
///
/// Implemented by whatever hosts the overlay: a DOM-ish document, a TUI
/// focus manager, a test double. Both operations are best-effort.
pub trait FocusHost {
    /// A cheap, cloneable reference to one focusable element.
    type Element: Clone + 'static;

    /// Look up the first element matching `selector`, if any.
    fn find(&self, selector: &str) -> Option<Self::Element>;

    /// Ask the environment to focus `element`. Returns whether the
    /// element accepted focus.
    fn focus(&self, element: &Self::Element) -> bool;
}

impl<'a, H: FocusHost + ?Sized> FocusHost for &'a H {
    type Element = H::Element;

    fn find(&self, selector: &str) -> Option<Self::Element> {
        (**self).find(selector)
    }

    fn focus(&self, element: &Self::Element) -> bool {
        (**self).focus(element)
    }
}

impl<H: FocusHost + ?Sized> FocusHost for Rc<H> {
    type Element = H::Element;

    fn find(&self, selector: &str) -> Option<Self::Element> {
        (**self).find(selector)
    }

    fn focus(&self, element: &Self::Element) -> bool {
        (**self).focus(element)
    }
}

/// Where focus should land once an invocation settles.
///
/// Resolved exactly once per settlement, from the policy snapshot taken
/// when `open()` accepted the invocation. Resolution is pure with respect
/// to controller state.
pub enum RestoreFocus<E> {
    /// The element that triggered `open()` (the default).
    Previous,
    /// A fixed element reference, used as-is.
    Element(E),
    /// A single host lookup for this selector; first match or none.
    Selector(String),
    /// A zero-argument closure; its return value is used as-is.
    Compute(Rc<dyn Fn() -> Option<E>>),
}

impl<E> Default for RestoreFocus<E> {
    fn default() -> Self {
        Self::Previous
    }
}

impl<E: Clone> Clone for RestoreFocus<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Previous => Self::Previous,
            Self::Element(element) => Self::Element(element.clone()),
            Self::Selector(selector) => Self::Selector(selector.clone()),
            Self::Compute(compute) => Self::Compute(Rc::clone(compute)),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for RestoreFocus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Previous => f.write_str("Previous"),
            Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl<E: Clone> RestoreFocus<E> {
    /// Policy that looks the target up by selector at settlement time.
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    /// Policy that computes the target at settlement time.
    pub fn compute(f: impl Fn() -> Option<E> + 'static) -> Self {
        Self::Compute(Rc::new(f))
    }

    /// Resolve this policy to a concrete element, or none.
    pub fn resolve_target<H>(&self, host: &H, trigger: Option<&E>) -> Option<E>
    where
        H: FocusHost<Element = E>,
    {
        match self {
            Self::Previous => trigger.cloned(),
            Self::Element(element) => Some(element.clone()),
            Self::Selector(selector) => host.find(selector),
            Self::Compute(compute) => compute(),
        }
    }
}
