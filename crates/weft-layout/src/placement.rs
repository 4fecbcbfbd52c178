#![forbid(unsafe_code)]

//! Child identity, cell spans, and placement records.

use std::fmt;
use std::ops::RangeInclusive;

use weft_core::geometry::Rect;

use crate::alignment::Alignment;
use crate::error::{GridError, Result};
use crate::placeable::ChildHandle;
use crate::track::Axis;

/// Stable identifier for a child placed in a layout.
///
/// Ids are arena slots tagged with a generation, so an id held after its
/// child was removed never aliases a later child in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChildId {
    index: u32,
    generation: u32,
}

impl ChildId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) const fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Inclusive block of cells occupied by one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSpan {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl CellSpan {
    /// A single cell.
    pub const fn cell(row: usize, col: usize) -> Self {
        Self {
            first_row: row,
            first_col: col,
            last_row: row,
            last_col: col,
        }
    }

    /// A block of `num_rows` x `num_cols` cells starting at `(row, col)`.
    pub fn new(row: usize, col: usize, num_rows: usize, num_cols: usize) -> Result<Self> {
        if num_rows == 0 || num_cols == 0 {
            return Err(GridError::EmptySpan);
        }
        let last_row = row
            .checked_add(num_rows - 1)
            .ok_or(GridError::SpanOutOfRange)?;
        let last_col = col
            .checked_add(num_cols - 1)
            .ok_or(GridError::SpanOutOfRange)?;
        let span = Self {
            first_row: row,
            first_col: col,
            last_row,
            last_col,
        };
        span.validate()?;
        Ok(span)
    }

    /// Reject spans whose fields were set by hand into an unusable shape.
    ///
    /// Every covered index must also leave room for a track count, so the
    /// last row and column must be below `usize::MAX`.
    pub fn validate(&self) -> Result<()> {
        if self.last_row < self.first_row || self.last_col < self.first_col {
            return Err(GridError::EmptySpan);
        }
        if self.last_row == usize::MAX || self.last_col == usize::MAX {
            return Err(GridError::SpanOutOfRange);
        }
        Ok(())
    }

    /// Number of rows covered.
    pub const fn num_rows(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    /// Number of columns covered.
    pub const fn num_cols(&self) -> usize {
        self.last_col - self.first_col + 1
    }

    /// Covered row indices.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first_row..=self.last_row
    }

    /// Covered column indices.
    pub fn cols(&self) -> RangeInclusive<usize> {
        self.first_col..=self.last_col
    }

    /// Covered track indices on `axis` (columns for horizontal).
    pub fn tracks(&self, axis: Axis) -> RangeInclusive<usize> {
        match axis {
            Axis::Horizontal => self.cols(),
            Axis::Vertical => self.rows(),
        }
    }

    /// True if `(row, col)` lies inside the span.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    /// True if the span lies entirely inside a `rows` x `cols` grid.
    pub fn fits_within(&self, rows: usize, cols: usize) -> bool {
        self.last_row < rows && self.last_col < cols
    }

    /// Iterate covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows()
            .flat_map(move |row| self.cols().map(move |col| (row, col)))
    }
}

impl fmt::Display for CellSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..={}, columns {}..={}",
            self.first_row, self.last_row, self.first_col, self.last_col
        )
    }
}

/// Bookkeeping for one child currently in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlacementRecord {
    pub(crate) span: CellSpan,
    pub(crate) alignment: Alignment,
    /// Bounds captured at insertion, restored on removal.
    pub(crate) original: Rect,
}

/// One child of an [`adopt`](crate::GridLayout::adopt) snapshot.
#[derive(Clone)]
pub struct Placement {
    pub child: ChildHandle,
    pub span: CellSpan,
    pub alignment: Alignment,
}

impl Placement {
    /// Place `child` in the single cell `(row, col)`, filling it.
    pub fn new(child: ChildHandle, row: usize, col: usize) -> Self {
        Self {
            child,
            span: CellSpan::cell(row, col),
            alignment: Alignment::NONE,
        }
    }

    /// Place `child` over an explicit span.
    pub fn spanning(child: ChildHandle, span: CellSpan) -> Self {
        Self {
            child,
            span,
            alignment: Alignment::NONE,
        }
    }

    /// Set the alignment.
    #[must_use]
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placement")
            .field("span", &self.span)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_new_rejects_empty() {
        assert_eq!(CellSpan::new(0, 0, 0, 1), Err(GridError::EmptySpan));
        assert_eq!(CellSpan::new(0, 0, 2, 0), Err(GridError::EmptySpan));
    }

    #[test]
    fn span_new_rejects_overflow() {
        assert_eq!(
            CellSpan::new(usize::MAX, 0, 2, 1),
            Err(GridError::SpanOutOfRange)
        );
        assert_eq!(
            CellSpan::new(0, usize::MAX, 1, 1),
            Err(GridError::SpanOutOfRange)
        );
    }

    #[test]
    fn inverted_span_fails_validation() {
        let span = CellSpan {
            first_row: 3,
            first_col: 0,
            last_row: 1,
            last_col: 0,
        };
        assert_eq!(span.validate(), Err(GridError::EmptySpan));
        assert!(CellSpan::cell(2, 2).validate().is_ok());
    }

    #[test]
    fn span_dimensions() {
        let span = CellSpan::new(1, 2, 3, 2).unwrap();
        assert_eq!(span.last_row, 3);
        assert_eq!(span.last_col, 3);
        assert_eq!(span.num_rows(), 3);
        assert_eq!(span.num_cols(), 2);
        assert_eq!(span.tracks(Axis::Horizontal), 2..=3);
        assert_eq!(span.tracks(Axis::Vertical), 1..=3);
    }

    #[test]
    fn span_cells_row_major() {
        let span = CellSpan::new(0, 0, 2, 2).unwrap();
        let cells: Vec<_> = span.cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn span_fits_within() {
        let span = CellSpan::new(1, 1, 2, 2).unwrap();
        assert!(span.fits_within(3, 3));
        assert!(!span.fits_within(2, 3));
        assert!(span.contains(2, 2));
        assert!(!span.contains(0, 1));
    }

    #[test]
    fn child_id_display() {
        assert_eq!(ChildId::new(3, 1).to_string(), "#3.1");
    }
}
