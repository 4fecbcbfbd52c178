#![forbid(unsafe_code)]

//! The capability a grid layout needs from the things it positions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use weft_core::geometry::{Rect, Size};

/// Anything a [`GridLayout`](crate::GridLayout) can size and position.
///
/// Implementors are owned by the host (usually a window hierarchy) behind
/// `Rc<RefCell<_>>`; the layout keeps only weak references and never
/// extends a child's lifetime.
pub trait Placeable {
    /// Current bounds (position and size) of the child.
    fn current_bounds(&self) -> Rect;

    /// Current size of the child.
    fn current_size(&self) -> Size {
        self.current_bounds().size()
    }

    /// Smallest size the child can be laid out at.
    fn minimum_size(&self) -> Size;

    /// Smallest size that is still usable if the child is given
    /// `candidate_width` pixels of width.
    ///
    /// Word-wrapping children report a height that depends on the width.
    fn minimum_usable_size(&self, candidate_width: i32) -> Size {
        let _ = candidate_width;
        self.minimum_size()
    }

    /// Largest size the child accepts (`None` = unbounded).
    ///
    /// Only consulted for aligned children, which are never grown past it.
    fn maximum_size(&self) -> Option<Size> {
        None
    }

    /// Move and resize the child. The one side effect a layout performs.
    fn resize_and_reposition(&mut self, bounds: Rect);
}

/// Shared, host-owned handle to a placeable child.
pub type ChildHandle = Rc<RefCell<dyn Placeable>>;

/// Non-owning reference stored in the layout's child arena.
pub(crate) type WeakChild = Weak<RefCell<dyn Placeable>>;
