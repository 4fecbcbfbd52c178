#![forbid(unsafe_code)]

//! Grid layout solver.
//!
//! Arranges [`Placeable`] children in a resizable grid of rows and columns:
//!
//! - [`GridLayout`] - the grid itself, its mutation API and solve driver
//! - [`TrackParams`] - per-row/column stretch weight and minimums
//! - [`Alignment`] - how a child sits inside its cells
//! - [`GridConfig`] - serializable layout parameters
//! - [`LayoutNotifier`] - coalesced re-solve requests from children
//!
//! # Solving
//!
//! Every solve runs two passes. Minimum sizes are propagated bottom-up from
//! the children into per-track effective minimums, then the container's
//! space is distributed top-down by stretch weight and every child is
//! resized into its block of cells. [`GridLayout`] is itself
//! [`Placeable`], so layouts nest.
//!
//! ```
//! use weft_core::geometry::{Point, Size};
//! use weft_layout::{GridLayout, Placeable};
//!
//! let mut grid = GridLayout::with_dimensions(1, 5);
//! grid.set_border_margin(3)?;
//! grid.set_cell_margin(2)?;
//! assert_eq!(grid.minimum_size(), Size::new(14, 6));
//!
//! grid.on_container_resized(Point::new(0, 0), Point::new(100, 20))?;
//! let extents: i32 = grid.column_tracks().iter().map(|t| t.extent()).sum();
//! assert_eq!(extents + 2 * 3 + 4 * 2, 100);
//! # Ok::<(), weft_layout::GridError>(())
//! ```

pub mod alignment;
pub mod config;
pub mod error;
pub mod grid;
pub mod placeable;
pub mod placement;
mod propagate;
pub mod solver;
pub mod track;

pub use alignment::Alignment;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use grid::{GridLayout, RemovalPolicy};
pub use placeable::{ChildHandle, Placeable};
pub use placement::{CellSpan, ChildId, Placement};
pub use solver::{LayoutNotifier, MAX_COALESCED_PASSES, SolveRequest, SolverState};
pub use track::{Axis, TrackParams};
pub use weft_core::geometry::{Point, Rect, Size};
