#![forbid(unsafe_code)]

//! Solver state machine and coalesced re-solve requests.
//!
//! A layout is always in one of three [`SolverState`]s. Requests to re-solve
//! may arrive at any time through a [`LayoutNotifier`], including from a
//! child that is being resized by the very pass in progress. Such requests
//! are not dropped: they accumulate in the notifier and the layout services
//! them once the current pass returns to [`SolverState::Idle`].

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;

/// Upper bound on follow-up passes serviced after the initial one.
///
/// A child that posts a new request on every resize would otherwise keep
/// the layout solving forever.
pub const MAX_COALESCED_PASSES: usize = 8;

/// What the solver is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolverState {
    /// Not solving; requests are serviced immediately.
    #[default]
    Idle,
    /// Recomputing effective minimums (bottom-up pass).
    Propagating,
    /// Distributing space and placing children (top-down pass).
    Distributing,
}

bitflags! {
    /// Work a pending re-solve must perform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SolveRequest: u8 {
        /// Child minimums may have changed; rerun propagation.
        const MINIMUMS  = 1 << 0;
        /// Geometry changed; redistribute and place children.
        const PLACEMENT = 1 << 1;
    }
}

/// Cloneable handle for posting re-solve requests to one layout.
///
/// Hand a clone to any child whose minimum size can change on its own
/// (for example text that re-wraps after a resize).
#[derive(Debug, Clone, Default)]
pub struct LayoutNotifier {
    pending: Rc<Cell<SolveRequest>>,
}

impl LayoutNotifier {
    /// Post a request. Requests merge with anything already pending.
    pub fn request(&self, request: SolveRequest) {
        self.pending.set(self.pending.get() | request);
    }

    /// Shorthand for a child whose minimum size changed.
    pub fn child_min_size_changed(&self) {
        self.request(SolveRequest::MINIMUMS | SolveRequest::PLACEMENT);
    }

    /// Requests posted but not yet serviced.
    #[must_use]
    pub fn pending(&self) -> SolveRequest {
        self.pending.get()
    }

    pub(crate) fn take(&self) -> SolveRequest {
        self.pending.replace(SolveRequest::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce() {
        let notifier = LayoutNotifier::default();
        let clone = notifier.clone();
        notifier.request(SolveRequest::PLACEMENT);
        clone.request(SolveRequest::PLACEMENT);
        clone.request(SolveRequest::MINIMUMS);
        assert_eq!(
            notifier.pending(),
            SolveRequest::MINIMUMS | SolveRequest::PLACEMENT
        );
        assert_eq!(notifier.take(), SolveRequest::all());
        assert!(clone.pending().is_empty());
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(SolverState::default(), SolverState::Idle);
    }
}
