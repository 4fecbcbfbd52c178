#![forbid(unsafe_code)]

use thiserror::Error;

use crate::placement::{CellSpan, ChildId};
use crate::track::Axis;

/// Result alias for grid layout operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised synchronously by the grid layout API.
///
/// None of these are transient: they indicate a misuse of the API or, for
/// [`GridError::FailedCalculationCheck`], a defect in the solver itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("margin must be non-negative, got {value}")]
    InvalidMargin { value: i32 },
    #[error("child {0} is not placed in this layout")]
    NoSuchChild(ChildId),
    #[error("cells ({span}) overlap child {occupant}")]
    AttemptedOverwrite { span: CellSpan, occupant: ChildId },
    /// Minimum propagation broke an internal invariant. Treat as fatal.
    #[error("minimum size propagation failed on the {axis} axis: {reason}")]
    FailedCalculationCheck { axis: Axis, reason: String },
    #[error("a placement must cover at least one row and one column")]
    EmptySpan,
    #[error("span reaches past the largest addressable cell")]
    SpanOutOfRange,
    #[error("child is already placed in this layout as {0}")]
    DuplicateChild(ChildId),
}
