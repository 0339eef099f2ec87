#![forbid(unsafe_code)]

//! The deferred result of an `open()` call.
//!
//! [`OutcomeHandle`] is a single-producer, multi-consumer one-shot cell:
//! it starts unsettled and transitions exactly once to a final
//! [`Outcome`], broadcast to every consumer that awaited it before or
//! after settlement. The producer side, `Settler`, is consumed by firing,
//! so a retained reference can never settle the same cell twice.
//!
//! Handles are `Rc`-backed and single-threaded (`!Send`), matching the
//! cooperative model of the controller: fulfillment happens synchronously
//! inside settlement, consumers resume per the host executor's
//! scheduling.
//!
//! # Invariants
//!
//! 1. A cell settles at most once; the first settlement wins.
//! 2. Wakers registered before settlement are woken in registration
//!    order, with no internal borrow held while waking.
//! 3. Polling after settlement is always `Ready` with a clone of the one
//!    settled outcome.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::outcome::Outcome;

enum CellState<V, R> {
    Pending { wakers: Vec<Waker> },
    Settled { outcome: Outcome<V, R> },
}

/// Create an unsettled cell, returning its producer and consumer sides.
pub(crate) fn deferred<V, R>() -> (Settler<V, R>, OutcomeHandle<V, R>) {
    let cell = Rc::new(RefCell::new(CellState::Pending { wakers: Vec::new() }));
    (
        Settler {
            cell: Rc::clone(&cell),
        },
        OutcomeHandle { cell },
    )
}

/// Producer side of a deferred outcome. Firing consumes it.
pub(crate) struct Settler<V, R> {
    cell: Rc<RefCell<CellState<V, R>>>,
}

impl<V, R> Settler<V, R> {
    /// Fix the cell's outcome and wake every registered consumer.
    pub(crate) fn settle(self, outcome: Outcome<V, R>) {
        let wakers = {
            let mut state = self.cell.borrow_mut();
            if matches!(*state, CellState::Settled { .. }) {
                return;
            }
            let CellState::Pending { wakers } =
                std::mem::replace(&mut *state, CellState::Settled { outcome })
            else {
                return;
            };
            wakers
        };
        // Borrow released before waking: a waker may poll synchronously.
        for waker in wakers {
            waker.wake();
        }
    }
}

/// Consumer handle for the eventual [`Outcome`] of one overlay invocation.
///
/// Cloning yields another consumer of the same cell; all clones observe
/// the same single outcome. Await it as a `Future`, or inspect it
/// non-blockingly with [`OutcomeHandle::peek`].
pub struct OutcomeHandle<V, R> {
    cell: Rc<RefCell<CellState<V, R>>>,
}

impl<V, R> Clone for OutcomeHandle<V, R> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<V, R> std::fmt::Debug for OutcomeHandle<V, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeHandle")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

impl<V, R> OutcomeHandle<V, R> {
    /// Whether the invocation has settled.
    pub fn is_settled(&self) -> bool {
        matches!(*self.cell.borrow(), CellState::Settled { .. })
    }
}

impl<V: Clone, R: Clone> OutcomeHandle<V, R> {
    /// The settled outcome, or `None` while the invocation is pending.
    pub fn peek(&self) -> Option<Outcome<V, R>> {
        match &*self.cell.borrow() {
            CellState::Settled { outcome } => Some(outcome.clone()),
            CellState::Pending { .. } => None,
        }
    }
}

impl<V: Clone, R: Clone> Future for OutcomeHandle<V, R> {
    type Output = Outcome<V, R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.cell.borrow_mut();
        match &mut *state {
            CellState::Settled { outcome } => Poll::Ready(outcome.clone()),
            CellState::Pending { wakers } => {
                let waker = cx.waker();
                if !wakers.iter().any(|registered| registered.will_wake(waker)) {
                    wakers.push(waker.clone());
                }
                Poll::Pending
            }
        }
    }
}
