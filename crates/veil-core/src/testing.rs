#![forbid(unsafe_code)]

//! Deterministic focus-host support for tests.
//!
//! [`TestFocusHost`] models the embedding environment as a selector
//! registry plus a log of focus handoffs. Elements are plain `String`
//! identifiers. Available to downstream crates behind the `test-helpers`
//! feature.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::focus::FocusHost;

/// In-memory focus host: selector registry + focus log.
#[derive(Debug, Default)]
pub struct TestFocusHost {
    selectors: RefCell<HashMap<String, String>>,
    focused: RefCell<Vec<String>>,
    unfocusable: RefCell<HashSet<String>>,
}

impl TestFocusHost {
    /// An empty host: no selectors match, every element accepts focus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `selector` resolve to `element`.
    pub fn register(&self, selector: &str, element: &str) {
        self.selectors
            .borrow_mut()
            .insert(selector.to_string(), element.to_string());
    }

    /// Make `element` reject focus handoffs.
    pub fn mark_unfocusable(&self, element: &str) {
        self.unfocusable.borrow_mut().insert(element.to_string());
    }

    /// Every element that accepted focus, in order.
    pub fn focus_log(&self) -> Vec<String> {
        self.focused.borrow().clone()
    }

    /// The most recently focused element, if any.
    pub fn last_focused(&self) -> Option<String> {
        self.focused.borrow().last().cloned()
    }
}

impl FocusHost for TestFocusHost {
    type Element = String;

    fn find(&self, selector: &str) -> Option<String> {
        self.selectors.borrow().get(selector).cloned()
    }

    fn focus(&self, element: &String) -> bool {
        if self.unfocusable.borrow().contains(element) {
            return false;
        }
        self.focused.borrow_mut().push(element.clone());
        true
    }
}
