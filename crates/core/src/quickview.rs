//! QuickView modal navigation as an explicit state machine.
//!
//! The modal shows one listing out of the current result list and lets the
//! user step forward and back. The current index lives in exactly one place
//! (the state), so URL sync and the rendered listing can never disagree.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuickViewState {
    #[default]
    Closed,
    Open { index: usize },
    /// A step was requested; the target is shown once the transition settles.
    Navigating { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickViewEvent {
    Open(usize),
    Next,
    Prev,
    Settle,
    Close,
    /// The underlying result list changed length.
    ListingsChanged(usize),
}

#[derive(Debug, Clone, Default)]
pub struct QuickView {
    state: QuickViewState,
    len: usize,
}

impl QuickView {
    pub fn new(len: usize) -> Self {
        Self {
            state: QuickViewState::Closed,
            len,
        }
    }

    pub fn state(&self) -> QuickViewState {
        self.state
    }

    /// Index of the listing that should be rendered, if any.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            QuickViewState::Closed => None,
            QuickViewState::Open { index } => Some(index),
            QuickViewState::Navigating { to, .. } => Some(to),
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_index().is_some_and(|i| i + 1 < self.len)
    }

    pub fn has_prev(&self) -> bool {
        self.current_index().is_some_and(|i| i > 0)
    }

    /// Apply an event. Returns `false` (and leaves the state untouched)
    /// when the event is not valid in the current state.
    pub fn apply(&mut self, event: QuickViewEvent) -> bool {
        use QuickViewEvent as E;
        use QuickViewState as S;

        let next = match (self.state, event) {
            (_, E::ListingsChanged(len)) => {
                self.len = len;
                match self.current_index() {
                    Some(_) if len == 0 => S::Closed,
                    Some(i) if i >= len => S::Open { index: len - 1 },
                    _ => self.state,
                }
            }
            (S::Closed, E::Open(i)) | (S::Open { .. }, E::Open(i)) if i < self.len => {
                S::Open { index: i }
            }
            (S::Open { index }, E::Next) if index + 1 < self.len => S::Navigating {
                from: index,
                to: index + 1,
            },
            (S::Open { index }, E::Prev) if index > 0 => S::Navigating {
                from: index,
                to: index - 1,
            },
            (S::Navigating { to, .. }, E::Settle) => S::Open { index: to },
            (S::Open { .. } | S::Navigating { .. }, E::Close) => S::Closed,
            _ => return false,
        };

        self.state = next;
        true
    }
}
