#![forbid(unsafe_code)]

//! The overlay-control state machine.
//!
//! An [`OverlayController`] gives an imperative caller a way to trigger a
//! user-dismissible overlay and await its eventual [`Outcome`], while a
//! decoupled view layer renders the overlay by observing `is_open` and
//! reports the user's action back through [`OverlayController::resolve`]
//! or [`OverlayController::dismiss`].
//!
//! # Invariants
//!
//! 1. At most one invocation is pending per controller at any time;
//!    `open` calls while one is in flight coalesce onto the same handle.
//! 2. Settlement fires at most once per invocation; a second `resolve`,
//!    `dismiss`, or teardown is a silent no-op.
//! 3. `is_open` is true iff an invocation is pending and unsettled.
//! 4. The trigger element is captured when `open` accepts the invocation
//!    and never updated afterwards; coalesced calls record nothing.
//!
//! # Failure Modes
//!
//! - `resolve`/`dismiss` with nothing pending: no-op, never an error.
//! - Focus restoration failure (no target, target rejects focus):
//!   silently skipped.
//! - Scope teardown while pending: settles as a dismissal with the
//!   reserved teardown reason, so no awaiting caller hangs.
//!
//! # Example
//!
//! ```ignore
//! let controller: OverlayController<bool, String, _> =
//!     OverlayController::new(host);
//!
//! // Caller side:
//! let confirmed = controller.open_from(save_button).await;
//!
//! // View side, on user action:
//! controller.resolve(true);            // or
//! controller.dismiss_with("backdrop".to_string());
//! ```

use std::cell::RefCell;
use std::fmt;

use tracing::{debug, trace};
use veil_reactive::{Binding, Observable, Subscription, bind_observable};

use crate::focus::{FocusHost, RestoreFocus};
use crate::handle::{self, OutcomeHandle, Settler};
use crate::outcome::Outcome;

/// Per-controller settlement policy. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct OverlayConfig<E> {
    /// How to pick the focus-restoration target at settlement.
    pub restore_focus: RestoreFocus<E>,
    /// Restore focus when the invocation resolves.
    pub restore_focus_on_resolved: bool,
    /// Restore focus when the invocation is dismissed.
    pub restore_focus_on_dismissed: bool,
    /// Force-dismiss a pending invocation when the controller's owning
    /// scope is torn down.
    pub dismiss_on_teardown: bool,
}

impl<E> Default for OverlayConfig<E> {
    fn default() -> Self {
        Self {
            restore_focus: RestoreFocus::Previous,
            restore_focus_on_resolved: true,
            restore_focus_on_dismissed: true,
            dismiss_on_teardown: true,
        }
    }
}

impl<E> OverlayConfig<E> {
    /// Set the focus-restoration policy.
    pub fn restore_focus(mut self, policy: RestoreFocus<E>) -> Self {
        self.restore_focus = policy;
        self
    }

    /// Set whether resolving restores focus.
    pub fn restore_focus_on_resolved(mut self, restore: bool) -> Self {
        self.restore_focus_on_resolved = restore;
        self
    }

    /// Set whether dismissing restores focus.
    pub fn restore_focus_on_dismissed(mut self, restore: bool) -> Self {
        self.restore_focus_on_dismissed = restore;
        self
    }

    /// Set whether teardown force-dismisses a pending invocation.
    pub fn dismiss_on_teardown(mut self, dismiss: bool) -> Self {
        self.dismiss_on_teardown = dismiss;
        self
    }
}

/// Per-invocation overrides for the focus-restoration policy.
///
/// Anything left unset falls back to the controller's [`OverlayConfig`].
/// The merged result is snapshotted when `open` accepts the invocation,
/// so settlement never re-reads live configuration.
#[derive(Debug, Clone)]
pub struct OpenOptions<E> {
    /// Override the focus-restoration target policy.
    pub restore_focus: Option<RestoreFocus<E>>,
    /// Override restore-on-resolve.
    pub restore_focus_on_resolved: Option<bool>,
    /// Override restore-on-dismiss.
    pub restore_focus_on_dismissed: Option<bool>,
}

impl<E> Default for OpenOptions<E> {
    fn default() -> Self {
        Self {
            restore_focus: None,
            restore_focus_on_resolved: None,
            restore_focus_on_dismissed: None,
        }
    }
}

impl<E> OpenOptions<E> {
    /// No overrides; the instance configuration applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the focus-restoration policy for this invocation.
    pub fn restore_focus(mut self, policy: RestoreFocus<E>) -> Self {
        self.restore_focus = Some(policy);
        self
    }

    /// Override restore-on-resolve for this invocation.
    pub fn restore_focus_on_resolved(mut self, restore: bool) -> Self {
        self.restore_focus_on_resolved = Some(restore);
        self
    }

    /// Override restore-on-dismiss for this invocation.
    pub fn restore_focus_on_dismissed(mut self, restore: bool) -> Self {
        self.restore_focus_on_dismissed = Some(restore);
        self
    }
}

/// One in-flight invocation. Exists only while `is_open` is true.
///
/// Holds the one-shot settler, the shared handle returned to every
/// coalesced `open` caller, the trigger captured at open time, and the
/// snapshot of the effective restoration policy.
struct PendingInvocation<V, R, E> {
    settler: Settler<V, R>,
    handle: OutcomeHandle<V, R>,
    trigger: Option<E>,
    restore_focus: RestoreFocus<E>,
    restore_on_resolved: bool,
    restore_on_dismissed: bool,
}

/// Overlay lifecycle controller: `idle` ⇄ `pending`, reusable
/// indefinitely.
///
/// `V` is the resolved-value type, `R` the application dismissal-reason
/// type, and `H` the embedding focus host. All methods take `&self`; the
/// controller is single-threaded and uses interior mutability, so the
/// owner can hand shared references to the view layer.
///
/// Dropping the controller is the lifecycle host's teardown notification:
/// with `dismiss_on_teardown` enabled (the default), a pending invocation
/// settles as a teardown dismissal so no awaiting caller is left hanging.
pub struct OverlayController<V, R, H: FocusHost> {
    host: H,
    config: OverlayConfig<H::Element>,
    is_open: Observable<bool>,
    pending: RefCell<Option<PendingInvocation<V, R, H::Element>>>,
}

impl<V, R, H: FocusHost> OverlayController<V, R, H> {
    /// Create a controller with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, OverlayConfig::default())
    }

    /// Create a controller with an explicit configuration.
    pub fn with_config(host: H, config: OverlayConfig<H::Element>) -> Self {
        Self {
            host,
            config,
            is_open: Observable::new(false),
            pending: RefCell::new(None),
        }
    }

    /// The embedding focus host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The instance configuration.
    pub fn config(&self) -> &OverlayConfig<H::Element> {
        &self.config
    }

    /// Whether an invocation is currently pending.
    pub fn is_open(&self) -> bool {
        self.is_open.get()
    }

    /// Observe open/close transitions. The callback fires on each change
    /// for the lifetime of the returned subscription.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn observe_open(&self, f: impl Fn(&bool) + 'static) -> Subscription {
        self.is_open.subscribe(f)
    }

    /// A read-only pull view of the open flag, for render loops.
    pub fn is_open_binding(&self) -> Binding<bool> {
        bind_observable(&self.is_open)
    }

    /// Open the overlay with no trigger element.
    pub fn open(&self) -> OutcomeHandle<V, R> {
        self.open_with(None, OpenOptions::default())
    }

    /// Open the overlay, capturing `trigger` for focus restoration.
    pub fn open_from(&self, trigger: H::Element) -> OutcomeHandle<V, R> {
        self.open_with(Some(trigger), OpenOptions::default())
    }

    /// Open the overlay with an optional trigger and per-invocation
    /// restoration overrides.
    ///
    /// If an invocation is already pending, the call coalesces: the
    /// existing handle is returned unchanged and neither the trigger nor
    /// the overrides are recorded. Otherwise the effective policy
    /// (overrides merged over the instance configuration) is snapshotted
    /// into the new invocation. Never fails.
    pub fn open_with(
        &self,
        trigger: Option<H::Element>,
        options: OpenOptions<H::Element>,
    ) -> OutcomeHandle<V, R> {
        let mut pending = self.pending.borrow_mut();
        if let Some(invocation) = pending.as_ref() {
            trace!("open coalesced onto in-flight invocation");
            return invocation.handle.clone();
        }

        let (settler, outcome_handle) = handle::deferred();
        *pending = Some(PendingInvocation {
            settler,
            handle: outcome_handle.clone(),
            trigger,
            restore_focus: options
                .restore_focus
                .unwrap_or_else(|| self.config.restore_focus.clone()),
            restore_on_resolved: options
                .restore_focus_on_resolved
                .unwrap_or(self.config.restore_focus_on_resolved),
            restore_on_dismissed: options
                .restore_focus_on_dismissed
                .unwrap_or(self.config.restore_focus_on_dismissed),
        });
        drop(pending);

        debug!("overlay opened");
        self.is_open.set(true);
        outcome_handle
    }

    /// Settle the pending invocation as resolved with `value`.
    ///
    /// No-op if nothing is pending or the invocation already settled.
    pub fn resolve(&self, value: V) {
        self.settle(Outcome::Resolved { value });
    }

    /// Settle the pending invocation as dismissed with no reason.
    ///
    /// Dismissal is also the cancellation primitive; it is idempotent.
    pub fn dismiss(&self) {
        self.settle(Outcome::dismissed());
    }

    /// Settle the pending invocation as dismissed with an application
    /// reason.
    pub fn dismiss_with(&self, reason: R) {
        self.settle(Outcome::dismissed_with(reason));
    }

    /// The lifecycle host's teardown notification.
    ///
    /// With `dismiss_on_teardown` enabled, force-dismisses a pending
    /// invocation with the reserved teardown reason. Also applied on
    /// `Drop`; calling it explicitly and then dropping is safe.
    pub fn teardown(&self) {
        if !self.config.dismiss_on_teardown {
            return;
        }
        self.settle(Outcome::teardown());
    }

    /// The shared settlement procedure: runs synchronously, exactly once
    /// per invocation.
    ///
    /// Taking the invocation out of the controller is the settled flag:
    /// a concurrent second attempt finds nothing and no-ops. State is
    /// cleared before the focus side effect and fulfillment, so anything
    /// those re-enter observes an idle controller.
    fn settle(&self, outcome: Outcome<V, R>) {
        let Some(invocation) = self.pending.borrow_mut().take() else {
            return;
        };

        debug!(
            resolved = outcome.is_resolved(),
            teardown = outcome.is_teardown(),
            "overlay settled"
        );
        self.is_open.set(false);

        let restore = if outcome.is_resolved() {
            invocation.restore_on_resolved
        } else {
            invocation.restore_on_dismissed
        };
        if restore {
            match invocation
                .restore_focus
                .resolve_target(&self.host, invocation.trigger.as_ref())
            {
                Some(target) => {
                    if !self.host.focus(&target) {
                        trace!("focus restoration target rejected focus");
                    }
                }
                None => trace!("no focus restoration target resolved"),
            }
        }

        invocation.settler.settle(outcome);
    }
}

impl<V, R, H: FocusHost> Drop for OverlayController<V, R, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<V, R, H: FocusHost> fmt::Debug for OverlayController<V, R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayController")
            .field("is_open", &self.is_open.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::DismissReason;
    use crate::testing::TestFocusHost;
    use futures_util::FutureExt;
    use std::rc::Rc;

    type Controller = OverlayController<i32, String, TestFocusHost>;

    fn controller() -> Controller {
        OverlayController::new(TestFocusHost::new())
    }

    #[test]
    fn starts_idle() {
        let ctrl = controller();
        assert!(!ctrl.is_open());
    }

    #[test]
    fn settle_with_nothing_pending_is_noop() {
        let ctrl = controller();
        ctrl.resolve(1);
        ctrl.dismiss();
        ctrl.dismiss_with("x".to_string());
        assert!(!ctrl.is_open());
        assert!(ctrl.host().focus_log().is_empty());
    }

    #[test]
    fn open_then_resolve_round_trip() {
        let ctrl = controller();
        let handle = ctrl.open();
        assert!(ctrl.is_open());

        ctrl.resolve(42);
        assert!(!ctrl.is_open());
        assert_eq!(handle.now_or_never(), Some(Outcome::resolved(42)));
    }

    #[test]
    fn open_then_dismiss_with_reason() {
        let ctrl = controller();
        let handle = ctrl.open();
        ctrl.dismiss_with("backdrop".to_string());
        assert_eq!(
            handle.now_or_never(),
            Some(Outcome::dismissed_with("backdrop".to_string()))
        );
    }

    #[test]
    fn dismiss_without_reason_has_none() {
        let ctrl = controller();
        let handle = ctrl.open();
        ctrl.dismiss();
        assert_eq!(handle.peek(), Some(Outcome::dismissed()));
        // No trigger was captured, so no focus handoff either.
        assert!(ctrl.host().focus_log().is_empty());
    }

    #[test]
    fn concurrent_opens_coalesce_onto_one_invocation() {
        let ctrl = controller();
        let transitions = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&transitions);
        let _sub = ctrl.observe_open(move |open| {
            if *open {
                *counter.borrow_mut() += 1;
            }
        });

        let first = ctrl.open_from("first-btn".to_string());
        let second = ctrl.open_from("second-btn".to_string());
        assert_eq!(*transitions.borrow(), 1);

        ctrl.resolve(7);
        assert_eq!(first.peek(), Some(Outcome::resolved(7)));
        assert_eq!(second.peek(), Some(Outcome::resolved(7)));
        // The trigger stays the one captured by the accepted open.
        assert_eq!(ctrl.host().focus_log(), vec!["first-btn".to_string()]);
    }

    #[test]
    fn second_settlement_is_a_silent_noop() {
        let ctrl = controller();
        let handle = ctrl.open();

        ctrl.resolve(1);
        ctrl.dismiss_with("late".to_string());
        ctrl.teardown();

        assert_eq!(handle.peek(), Some(Outcome::resolved(1)));
    }

    #[test]
    fn controller_is_reusable_after_settlement() {
        let ctrl = controller();

        let first = ctrl.open();
        ctrl.resolve(1);

        let second = ctrl.open();
        assert!(ctrl.is_open());
        ctrl.dismiss();

        assert_eq!(first.peek(), Some(Outcome::resolved(1)));
        assert_eq!(second.peek(), Some(Outcome::dismissed()));
        assert!(!ctrl.is_open());
    }

    #[test]
    fn resolve_restores_focus_to_trigger() {
        let ctrl = controller();
        ctrl.open_from("open-btn".to_string());
        ctrl.resolve(1);
        assert_eq!(ctrl.host().last_focused(), Some("open-btn".to_string()));
    }

    #[test]
    fn focus_toggles_are_independent_per_outcome() {
        let host = TestFocusHost::new();
        let config = OverlayConfig::default()
            .restore_focus_on_resolved(false)
            .restore_focus_on_dismissed(true);
        let ctrl: OverlayController<i32, String, _> = OverlayController::with_config(host, config);

        ctrl.open_from("btn".to_string());
        ctrl.resolve(1);
        assert!(ctrl.host().focus_log().is_empty());

        ctrl.open_from("btn".to_string());
        ctrl.dismiss();
        assert_eq!(ctrl.host().focus_log(), vec!["btn".to_string()]);
    }

    #[test]
    fn selector_policy_ignores_trigger() {
        let host = TestFocusHost::new();
        host.register("#save-btn", "save-btn");
        let config = OverlayConfig::default().restore_focus(RestoreFocus::selector("#save-btn"));
        let ctrl: OverlayController<i32, String, _> = OverlayController::with_config(host, config);

        ctrl.open_from("unrelated-trigger".to_string());
        ctrl.resolve(1);
        assert_eq!(ctrl.host().focus_log(), vec!["save-btn".to_string()]);
    }

    #[test]
    fn unfocusable_target_is_silently_skipped() {
        let host = TestFocusHost::new();
        host.mark_unfocusable("btn");
        let ctrl: OverlayController<i32, String, _> = OverlayController::new(host);

        let handle = ctrl.open_from("btn".to_string());
        ctrl.resolve(1);

        assert!(ctrl.host().focus_log().is_empty());
        assert_eq!(handle.peek(), Some(Outcome::resolved(1)));
    }

    #[test]
    fn teardown_settles_pending_invocation() {
        let ctrl = controller();
        let handle = ctrl.open();

        ctrl.teardown();
        assert!(!ctrl.is_open());
        let outcome = handle.peek().unwrap();
        assert!(outcome.is_teardown());
        assert_eq!(outcome.reason(), Some(&DismissReason::Teardown));
    }

    #[test]
    fn teardown_while_idle_is_noop() {
        let ctrl = controller();
        ctrl.teardown();
        assert!(!ctrl.is_open());
    }

    #[test]
    fn teardown_can_be_disabled() {
        let config = OverlayConfig::default().dismiss_on_teardown(false);
        let ctrl: OverlayController<i32, String, _> =
            OverlayController::with_config(TestFocusHost::new(), config);

        let handle = ctrl.open();
        ctrl.teardown();

        assert!(ctrl.is_open());
        assert!(!handle.is_settled());
    }

    #[test]
    fn drop_settles_with_teardown_reason() {
        let host = Rc::new(TestFocusHost::new());
        let ctrl: OverlayController<i32, String, _> = OverlayController::new(Rc::clone(&host));

        let handle = ctrl.open_from("btn".to_string());
        drop(ctrl);

        assert!(handle.peek().unwrap().is_teardown());
        // Teardown is a dismissal, so the default config restores focus.
        assert_eq!(host.last_focused(), Some("btn".to_string()));
    }

    #[test]
    fn per_open_overrides_apply_to_that_invocation_only() {
        let host = TestFocusHost::new();
        host.register("#fallback", "fallback");
        let config = OverlayConfig::default().restore_focus(RestoreFocus::selector("#fallback"));
        let ctrl: OverlayController<i32, String, _> = OverlayController::with_config(host, config);

        // Overridden invocation: restore to the trigger, not the selector.
        ctrl.open_with(
            Some("trigger".to_string()),
            OpenOptions::new().restore_focus(RestoreFocus::Previous),
        );
        ctrl.resolve(1);
        assert_eq!(ctrl.host().focus_log(), vec!["trigger".to_string()]);

        // Next invocation falls back to the instance configuration.
        ctrl.open_from("trigger".to_string());
        ctrl.resolve(2);
        assert_eq!(
            ctrl.host().focus_log(),
            vec!["trigger".to_string(), "fallback".to_string()]
        );
    }

    #[test]
    fn override_can_suppress_restoration() {
        let ctrl = controller();
        ctrl.open_with(
            Some("btn".to_string()),
            OpenOptions::new().restore_focus_on_resolved(false),
        );
        ctrl.resolve(1);
        assert!(ctrl.host().focus_log().is_empty());
    }

    #[test]
    fn is_open_binding_tracks_state() {
        let ctrl = controller();
        let binding = ctrl.is_open_binding();
        assert!(!binding.get());

        ctrl.open();
        assert!(binding.get());

        ctrl.dismiss();
        assert!(!binding.get());
    }

    #[test]
    fn compute_policy_runs_at_settlement() {
        let host = TestFocusHost::new();
        let target = Rc::new(RefCell::new(None::<String>));
        let target_cell = Rc::clone(&target);
        let config = OverlayConfig::default()
            .restore_focus(RestoreFocus::compute(move || target_cell.borrow().clone()));
        let ctrl: OverlayController<i32, String, _> = OverlayController::with_config(host, config);

        ctrl.open();
        // The target only becomes known while the overlay is up.
        *target.borrow_mut() = Some("late-btn".to_string());
        ctrl.resolve(1);

        assert_eq!(ctrl.host().last_focused(), Some("late-btn".to_string()));
    }
}
