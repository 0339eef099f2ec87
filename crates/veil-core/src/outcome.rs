#![forbid(unsafe_code)]

//! The settled result of one overlay invocation.
//!
//! Every invocation ends in exactly one [`Outcome`]: resolved with a
//! caller-supplied value, or dismissed with an optional reason. The reason
//! reserved for forced dismissal on scope teardown is its own
//! [`DismissReason`] variant, so an application reason can never collide
//! with it.

/// Why a dismissed invocation was dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DismissReason<R> {
    /// Forced dismissal because the controller's owning scope was torn
    /// down. Reserved; never produced by `dismiss_with`.
    Teardown,
    /// An application-supplied reason (backdrop click, escape key, ...).
    App(R),
}

impl<R> DismissReason<R> {
    /// True for the reserved teardown reason.
    pub fn is_teardown(&self) -> bool {
        matches!(self, Self::Teardown)
    }

    /// The application-supplied reason, if this is not a teardown.
    pub fn app(&self) -> Option<&R> {
        match self {
            Self::Teardown => None,
            Self::App(reason) => Some(reason),
        }
    }
}

/// The final result of one overlay invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "lowercase"))]
pub enum Outcome<V, R> {
    /// The interaction completed with a caller-supplied payload.
    Resolved { value: V },
    /// The interaction was abandoned, optionally with a reason.
    Dismissed {
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        reason: Option<DismissReason<R>>,
    },
}

impl<V, R> Outcome<V, R> {
    /// A resolved outcome carrying `value`.
    pub fn resolved(value: V) -> Self {
        Self::Resolved { value }
    }

    /// A dismissed outcome with no reason.
    pub fn dismissed() -> Self {
        Self::Dismissed { reason: None }
    }

    /// A dismissed outcome with an application-supplied reason.
    pub fn dismissed_with(reason: R) -> Self {
        Self::Dismissed {
            reason: Some(DismissReason::App(reason)),
        }
    }

    /// The outcome produced by forced dismissal on teardown.
    pub fn teardown() -> Self {
        Self::Dismissed {
            reason: Some(DismissReason::Teardown),
        }
    }

    /// True if the interaction completed via `resolve`.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// True if the interaction was dismissed (including teardown).
    pub fn is_dismissed(&self) -> bool {
        matches!(self, Self::Dismissed { .. })
    }

    /// True if this is a forced teardown dismissal.
    pub fn is_teardown(&self) -> bool {
        matches!(
            self,
            Self::Dismissed {
                reason: Some(DismissReason::Teardown)
            }
        )
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Resolved { value } => Some(value),
            Self::Dismissed { .. } => None,
        }
    }

    /// Consume the outcome, returning the resolved value if any.
    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Resolved { value } => Some(value),
            Self::Dismissed { .. } => None,
        }
    }

    /// The dismissal reason, if any was supplied.
    pub fn reason(&self) -> Option<&DismissReason<R>> {
        match self {
            Self::Resolved { .. } => None,
            Self::Dismissed { reason } => reason.as_ref(),
        }
    }
}
