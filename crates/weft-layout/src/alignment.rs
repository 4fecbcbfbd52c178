#![forbid(unsafe_code)]

//! Per-child alignment flags.

use bitflags::bitflags;

bitflags! {
    /// How a child sits inside its cell rectangle.
    ///
    /// An empty set stretches the child to fill its cells. Horizontal and
    /// vertical flags are independent; an axis without a flag is filled.
    /// When flags on one axis conflict, `CENTER` beats `RIGHT` beats `LEFT`
    /// and `VCENTER` beats `BOTTOM` beats `TOP`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Alignment: u8 {
        /// Flush with the left edge of the cell.
        const LEFT    = 1 << 0;
        /// Flush with the right edge of the cell.
        const RIGHT   = 1 << 1;
        /// Centered horizontally.
        const CENTER  = 1 << 2;
        /// Flush with the top edge of the cell.
        const TOP     = 1 << 3;
        /// Flush with the bottom edge of the cell.
        const BOTTOM  = 1 << 4;
        /// Centered vertically.
        const VCENTER = 1 << 5;
    }
}

impl Alignment {
    /// Stretch to fill (no flags).
    pub const NONE: Self = Self::empty();

    /// Resolved placement on the horizontal axis, if any flag is set.
    pub(crate) fn horizontal(self) -> Option<AxisPlacement> {
        if self.contains(Self::CENTER) {
            Some(AxisPlacement::Center)
        } else if self.contains(Self::RIGHT) {
            Some(AxisPlacement::End)
        } else if self.contains(Self::LEFT) {
            Some(AxisPlacement::Start)
        } else {
            None
        }
    }

    /// Resolved placement on the vertical axis, if any flag is set.
    pub(crate) fn vertical(self) -> Option<AxisPlacement> {
        if self.contains(Self::VCENTER) {
            Some(AxisPlacement::Center)
        } else if self.contains(Self::BOTTOM) {
            Some(AxisPlacement::End)
        } else if self.contains(Self::TOP) {
            Some(AxisPlacement::Start)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisPlacement {
    Start,
    Center,
    End,
}

impl AxisPlacement {
    /// Offset of an item of `size` inside `available` pixels.
    pub(crate) fn offset(self, available: i32, size: i32) -> i32 {
        let leftover = available.saturating_sub(size).max(0);
        match self {
            AxisPlacement::Start => 0,
            AxisPlacement::Center => leftover / 2,
            AxisPlacement::End => leftover,
        }
    }
}
