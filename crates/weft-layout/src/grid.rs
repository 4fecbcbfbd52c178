#![forbid(unsafe_code)]

//! 2D grid layout with stretch weights, cell spanning, and per-child alignment.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use weft_core::geometry::{Point, Rect, Size};
//! use weft_layout::{Alignment, GridLayout, Placeable};
//!
//! struct Label {
//!     bounds: Rect,
//!     min: Size,
//! }
//!
//! impl Placeable for Label {
//!     fn current_bounds(&self) -> Rect {
//!         self.bounds
//!     }
//!     fn minimum_size(&self) -> Size {
//!         self.min
//!     }
//!     fn resize_and_reposition(&mut self, bounds: Rect) {
//!         self.bounds = bounds;
//!     }
//! }
//!
//! let label = Rc::new(RefCell::new(Label {
//!     bounds: Rect::default(),
//!     min: Size::new(40, 10),
//! }));
//!
//! let mut grid = GridLayout::with_dimensions(1, 2);
//! grid.set_column_stretch(1, 1.0)?;
//! grid.add(label.clone(), 0, 0, Alignment::NONE)?;
//! grid.on_container_resized(Point::new(0, 0), Point::new(200, 30))?;
//!
//! assert_eq!(label.borrow().bounds, Rect::new(0, 0, 40, 30));
//! # Ok::<(), weft_layout::GridError>(())
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use weft_core::geometry::{Point, Rect, Size};
use weft_core::{debug, debug_span, error, trace, warn};

use crate::alignment::Alignment;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::placeable::{ChildHandle, Placeable, WeakChild};
use crate::placement::{CellSpan, ChildId, Placement, PlacementRecord};
use crate::propagate::{Requirement, propagate_minimums};
use crate::solver::{LayoutNotifier, MAX_COALESCED_PASSES, SolveRequest, SolverState};
use crate::track::{Axis, TrackParams, cell_margin_total, distribute, minimum_extent};

/// What happens to a child's geometry when it leaves the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RemovalPolicy {
    /// Put the child back where it was before it was added.
    #[default]
    RestoreOriginal,
    /// Leave the child at its last laid-out position.
    KeepCurrent,
}

#[derive(Debug)]
struct Entry {
    handle: WeakChild,
    record: PlacementRecord,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// A grid of cells that sizes and positions [`Placeable`] children.
///
/// Every mutation re-solves the layout before returning. A solve runs two
/// passes: effective minimums are propagated bottom-up from the children,
/// then the container's space is distributed top-down by stretch weight and
/// each child is resized into its cells.
#[derive(Debug)]
pub struct GridLayout {
    bounds: Rect,
    rows: Vec<TrackParams>,
    columns: Vec<TrackParams>,
    /// Row-major cell occupancy.
    cells: Vec<Vec<Option<ChildId>>>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    border_margin: i32,
    cell_margin: i32,
    render_outline: bool,
    state: SolverState,
    notifier: LayoutNotifier,
    minimums_valid: bool,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GridLayout {
    /// An empty 0x0 layout.
    pub fn new() -> Self {
        Self::with_dimensions(0, 0)
    }

    /// A `rows` x `columns` layout with default track parameters.
    pub fn with_dimensions(rows: usize, columns: usize) -> Self {
        Self {
            bounds: Rect::default(),
            rows: vec![TrackParams::default(); rows],
            columns: vec![TrackParams::default(); columns],
            cells: vec![vec![None; columns]; rows],
            slots: Vec::new(),
            free: Vec::new(),
            border_margin: 0,
            cell_margin: 0,
            render_outline: false,
            state: SolverState::Idle,
            notifier: LayoutNotifier::default(),
            minimums_valid: false,
        }
    }

    /// Build an empty layout from a configuration.
    pub fn with_config(config: &GridConfig) -> Result<Self> {
        config.validate()?;
        let mut layout = Self::with_dimensions(config.row_count(), config.column_count());
        layout.border_margin = config.border_margin;
        layout.cell_margin = config.cell_margin;
        layout.render_outline = config.render_outline;
        for (track, &stretch) in layout.rows.iter_mut().zip(&config.row_stretches) {
            track.set_stretch(stretch);
        }
        for (track, &min) in layout.rows.iter_mut().zip(&config.row_minimums) {
            track.set_declared_min(min);
        }
        for (track, &stretch) in layout.columns.iter_mut().zip(&config.column_stretches) {
            track.set_stretch(stretch);
        }
        for (track, &min) in layout.columns.iter_mut().zip(&config.column_minimums) {
            track.set_declared_min(min);
        }
        Ok(layout)
    }

    /// Build a fully placed layout from a snapshot of children.
    ///
    /// Either every placement succeeds and the solved layout is returned, or
    /// an error is returned and no child has been touched.
    pub fn adopt(
        bounds: Rect,
        config: &GridConfig,
        placements: impl IntoIterator<Item = Placement>,
    ) -> Result<Self> {
        let mut layout = Self::with_config(config)?;
        layout.bounds = bounds;
        for placement in placements {
            layout.insert(placement.child, placement.span, placement.alignment)?;
        }
        layout.redo_layout()?;
        Ok(layout)
    }

    /// Snapshot the current parameters.
    pub fn config(&self) -> GridConfig {
        GridConfig {
            rows: self.rows.len(),
            columns: self.columns.len(),
            border_margin: self.border_margin,
            cell_margin: self.cell_margin,
            row_stretches: self.rows.iter().map(|t| t.stretch).collect(),
            column_stretches: self.columns.iter().map(|t| t.stretch).collect(),
            row_minimums: self.rows.iter().map(|t| t.declared_min).collect(),
            column_minimums: self.columns.iter().map(|t| t.declared_min).collect(),
            render_outline: self.render_outline,
        }
    }

    // ------------------------------------------------------------------
    // Mutation API
    // ------------------------------------------------------------------

    /// Place `child` in the single cell `(row, col)`.
    ///
    /// Grows the grid if needed. Fails with [`GridError::AttemptedOverwrite`]
    /// if the cell is occupied, in which case nothing changes.
    pub fn add(
        &mut self,
        child: ChildHandle,
        row: usize,
        col: usize,
        alignment: Alignment,
    ) -> Result<ChildId> {
        self.add_spanning(child, CellSpan::cell(row, col), alignment)
    }

    /// Place `child` over every cell of `span`.
    pub fn add_spanning(
        &mut self,
        child: ChildHandle,
        span: CellSpan,
        alignment: Alignment,
    ) -> Result<ChildId> {
        let id = self.insert(child, span, alignment)?;
        self.redo_layout()?;
        Ok(id)
    }

    /// Take `id` out of the layout. Returns `false` if it was not present.
    pub fn remove(&mut self, id: ChildId, policy: RemovalPolicy) -> Result<bool> {
        if self.detach(id, policy).is_none() {
            return Ok(false);
        }
        self.redo_layout()?;
        Ok(true)
    }

    /// Remove every child, returning the live ones in row-major order.
    pub fn detach_all(&mut self, policy: RemovalPolicy) -> Result<Vec<ChildHandle>> {
        let children = self.children();
        let mut detached = Vec::with_capacity(children.len());
        for (id, handle) in children {
            self.detach(id, policy);
            detached.push(handle);
        }
        self.purge_expired();
        self.redo_layout()?;
        Ok(detached)
    }

    /// Grow or truncate the grid to `rows` x `columns`.
    ///
    /// Children that do not fit entirely inside the new grid are removed
    /// (with their original geometry restored) and their ids returned.
    pub fn resize_layout(&mut self, rows: usize, columns: usize) -> Result<Vec<ChildId>> {
        self.purge_expired();
        let doomed: Vec<ChildId> = self
            .live_entries()
            .filter(|(_, entry)| !entry.record.span.fits_within(rows, columns))
            .map(|(id, _)| id)
            .collect();
        for &id in &doomed {
            debug!(child = %id, rows, columns, "child removed by grid truncation");
            self.detach(id, RemovalPolicy::RestoreOriginal);
        }
        self.set_dimensions(rows, columns);
        self.minimums_valid = false;
        self.redo_layout()?;
        Ok(doomed)
    }

    /// Set the stretch weight of one row, growing the grid if needed.
    pub fn set_row_stretch(&mut self, row: usize, stretch: f64) -> Result<()> {
        self.update_track(Axis::Vertical, row, |t| t.set_stretch(stretch))
    }

    /// Set the stretch weight of one column, growing the grid if needed.
    pub fn set_column_stretch(&mut self, col: usize, stretch: f64) -> Result<()> {
        self.update_track(Axis::Horizontal, col, |t| t.set_stretch(stretch))
    }

    /// Set the declared minimum height of one row.
    pub fn set_minimum_row_height(&mut self, row: usize, height: i32) -> Result<()> {
        self.update_track(Axis::Vertical, row, |t| t.set_declared_min(height))
    }

    /// Set the declared minimum width of one column.
    pub fn set_minimum_column_width(&mut self, col: usize, width: i32) -> Result<()> {
        self.update_track(Axis::Horizontal, col, |t| t.set_declared_min(width))
    }

    /// Set row stretch weights starting at row 0.
    pub fn set_row_stretches(&mut self, stretches: impl IntoIterator<Item = f64>) -> Result<()> {
        self.update_tracks(Axis::Vertical, stretches, TrackParams::set_stretch)
    }

    /// Set column stretch weights starting at column 0.
    pub fn set_column_stretches(
        &mut self,
        stretches: impl IntoIterator<Item = f64>,
    ) -> Result<()> {
        self.update_tracks(Axis::Horizontal, stretches, TrackParams::set_stretch)
    }

    /// Set declared row minimums starting at row 0.
    pub fn set_minimum_row_heights(
        &mut self,
        heights: impl IntoIterator<Item = i32>,
    ) -> Result<()> {
        self.update_tracks(Axis::Vertical, heights, TrackParams::set_declared_min)
    }

    /// Set declared column minimums starting at column 0.
    pub fn set_minimum_column_widths(
        &mut self,
        widths: impl IntoIterator<Item = i32>,
    ) -> Result<()> {
        self.update_tracks(Axis::Horizontal, widths, TrackParams::set_declared_min)
    }

    /// Space between the layout bounds and the outermost cells.
    pub fn set_border_margin(&mut self, margin: i32) -> Result<()> {
        if margin < 0 {
            return Err(GridError::InvalidMargin { value: margin });
        }
        self.border_margin = margin;
        self.minimums_valid = false;
        self.redo_layout()
    }

    /// Space between adjacent cells.
    pub fn set_cell_margin(&mut self, margin: i32) -> Result<()> {
        if margin < 0 {
            return Err(GridError::InvalidMargin { value: margin });
        }
        self.cell_margin = margin;
        self.minimums_valid = false;
        self.redo_layout()
    }

    /// Change how a child sits in its cells. No-op if `id` is not present.
    pub fn set_child_alignment(&mut self, id: ChildId, alignment: Alignment) -> Result<()> {
        let Some(entry) = self.entry_mut(id) else {
            return Ok(());
        };
        entry.record.alignment = alignment;
        self.redo_layout()
    }

    /// Debug flag consumed by renderers that outline the cell grid.
    pub fn set_render_outline(&mut self, enabled: bool) {
        self.render_outline = enabled;
    }

    // ------------------------------------------------------------------
    // Owner notifications
    // ------------------------------------------------------------------

    /// The container moved or resized.
    ///
    /// Returns `false` without solving when the bounds are unchanged and no
    /// work is pending.
    pub fn on_container_resized(&mut self, upper_left: Point, lower_right: Point) -> Result<bool> {
        let bounds = Rect::from_corners(upper_left, lower_right);
        if bounds == self.bounds && self.minimums_valid && self.notifier.pending().is_empty() {
            trace!(%bounds, "container bounds unchanged; skipping solve");
            return Ok(false);
        }
        self.bounds = bounds;
        self.redo_layout()?;
        Ok(true)
    }

    /// A child's minimum size changed; rerun both passes.
    pub fn on_child_min_size_changed(&mut self) -> Result<()> {
        self.minimums_valid = false;
        self.redo_layout()
    }

    /// Handle for posting re-solve requests, e.g. from children.
    pub fn notifier(&self) -> LayoutNotifier {
        self.notifier.clone()
    }

    /// Service requests posted through the [`notifier`](Self::notifier).
    ///
    /// Returns `true` if at least one pass ran.
    pub fn process_pending(&mut self) -> Result<bool> {
        Ok(self.service_requests()? > 0)
    }

    /// Re-solve the layout now.
    pub fn redo_layout(&mut self) -> Result<()> {
        let mut request = SolveRequest::PLACEMENT;
        if !self.minimums_valid {
            request |= SolveRequest::MINIMUMS;
        }
        self.notifier.request(request);
        self.service_requests().map(|_| ())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of live children.
    pub fn len(&self) -> usize {
        self.live_entries().count()
    }

    /// True if no live child is placed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row parameters, top to bottom.
    pub fn row_tracks(&self) -> &[TrackParams] {
        &self.rows
    }

    /// Column parameters, left to right.
    pub fn column_tracks(&self) -> &[TrackParams] {
        &self.columns
    }

    pub fn row_stretch(&self, row: usize) -> Option<f64> {
        self.rows.get(row).map(TrackParams::stretch)
    }

    pub fn column_stretch(&self, col: usize) -> Option<f64> {
        self.columns.get(col).map(TrackParams::stretch)
    }

    pub fn minimum_row_height(&self, row: usize) -> Option<i32> {
        self.rows.get(row).map(TrackParams::declared_min)
    }

    pub fn minimum_column_width(&self, col: usize) -> Option<i32> {
        self.columns.get(col).map(TrackParams::declared_min)
    }

    /// Row minimum after the last propagation pass.
    pub fn effective_row_minimum(&self, row: usize) -> Option<i32> {
        self.rows.get(row).map(TrackParams::effective_min)
    }

    /// Column minimum after the last propagation pass.
    pub fn effective_column_minimum(&self, col: usize) -> Option<i32> {
        self.columns.get(col).map(TrackParams::effective_min)
    }

    pub fn border_margin(&self) -> i32 {
        self.border_margin
    }

    pub fn cell_margin(&self) -> i32 {
        self.cell_margin
    }

    pub fn render_outline(&self) -> bool {
        self.render_outline
    }

    /// Container bounds the layout was last solved against.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn solver_state(&self) -> SolverState {
        self.state
    }

    /// Alignment of a placed child.
    pub fn child_alignment(&self, id: ChildId) -> Result<Alignment> {
        self.entry(id)
            .map(|entry| entry.record.alignment)
            .ok_or(GridError::NoSuchChild(id))
    }

    /// Cells occupied by a placed child.
    pub fn child_span(&self, id: ChildId) -> Result<CellSpan> {
        self.entry(id)
            .map(|entry| entry.record.span)
            .ok_or(GridError::NoSuchChild(id))
    }

    /// Strong handle to a live child.
    pub fn child(&self, id: ChildId) -> Option<ChildHandle> {
        self.entry(id).and_then(|entry| entry.handle.upgrade())
    }

    /// Id of `child` if it is placed in this layout.
    pub fn child_id<P: Placeable + ?Sized>(&self, child: &Rc<RefCell<P>>) -> Option<ChildId> {
        let target = Rc::as_ptr(child);
        self.live_entries()
            .find(|(_, entry)| std::ptr::addr_eq(entry.handle.as_ptr(), target))
            .map(|(id, _)| id)
    }

    /// Live children in row-major order of their first cell.
    pub fn children(&self) -> Vec<(ChildId, ChildHandle)> {
        let mut children: Vec<(CellSpan, ChildId, ChildHandle)> = self
            .live_entries()
            .filter_map(|(id, entry)| {
                entry
                    .handle
                    .upgrade()
                    .map(|handle| (entry.record.span, id, handle))
            })
            .collect();
        children.sort_by_key(|(span, _, _)| (span.first_row, span.first_col));
        children
            .into_iter()
            .map(|(_, id, handle)| (id, handle))
            .collect()
    }

    /// Occupancy matrix (row-major). Dropped children read as empty.
    pub fn cells(&self) -> Vec<Vec<Option<ChildId>>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.filter(|&id| self.is_live(id)))
                    .collect()
            })
            .collect()
    }

    /// Absolute pixel rectangle of every cell (row-major).
    pub fn cell_rects(&self) -> Vec<Vec<Rect>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| Rect::new(col.origin, row.origin, col.extent, row.extent))
                    .collect()
            })
            .collect()
    }

    /// Cell rectangles relative to the layout's upper-left corner.
    pub fn relative_cell_rects(&self) -> Vec<Vec<Rect>> {
        let origin = self.bounds.upper_left();
        self.cell_rects()
            .into_iter()
            .map(|row| row.into_iter().map(|rect| rect.relative_to(origin)).collect())
            .collect()
    }

    /// Smallest size the layout can take: border margins, effective
    /// minimums, and cell margins on each axis.
    pub fn total_minimum_size(&self) -> Result<Size> {
        if self.minimums_valid {
            return Ok(self.cached_minimum_size());
        }
        let (column_mins, row_mins) = self.solve_minimums(None)?;
        Ok(self.extent_of(column_mins, row_mins))
    }

    // ------------------------------------------------------------------
    // Solve driver
    // ------------------------------------------------------------------

    fn service_requests(&mut self) -> Result<usize> {
        let mut passes = 0;
        loop {
            let request = self.notifier.take();
            if request.is_empty() {
                return Ok(passes);
            }
            if passes > MAX_COALESCED_PASSES {
                warn!(passes, "re-solve requests keep arriving; deferring the rest");
                self.notifier.request(request);
                return Ok(passes);
            }
            if passes > 0 {
                trace!(?request, "servicing coalesced re-solve request");
            }
            self.solve_pass(request)?;
            passes += 1;
        }
    }

    fn solve_pass(&mut self, request: SolveRequest) -> Result<()> {
        let span = debug_span!(
            "grid_solve",
            rows = self.rows.len(),
            columns = self.columns.len(),
            width = self.bounds.width,
            height = self.bounds.height
        );
        let _guard = span.enter();

        self.purge_expired();

        if request.contains(SolveRequest::MINIMUMS) || !self.minimums_valid {
            self.state = SolverState::Propagating;
            let (column_mins, row_mins) = match self.solve_minimums(None) {
                Ok(mins) => mins,
                Err(err) => {
                    self.state = SolverState::Idle;
                    error!(error = %err, "minimum size propagation failed");
                    return Err(err);
                }
            };
            for (track, min) in self.columns.iter_mut().zip(column_mins) {
                track.effective_min = min;
            }
            for (track, min) in self.rows.iter_mut().zip(row_mins) {
                track.effective_min = min;
            }
            self.minimums_valid = true;
        }

        self.state = SolverState::Distributing;
        distribute(
            &mut self.columns,
            self.bounds.x,
            self.bounds.width,
            self.border_margin,
            self.cell_margin,
        );
        distribute(
            &mut self.rows,
            self.bounds.y,
            self.bounds.height,
            self.border_margin,
            self.cell_margin,
        );
        self.place_children();
        self.state = SolverState::Idle;
        Ok(())
    }

    /// Effective minimums for columns and rows, without touching `self`.
    ///
    /// Row requirements depend on the width each child gets: the columns'
    /// effective minimums, or the columns distributed over
    /// `candidate_width` when one is given.
    fn solve_minimums(&self, candidate_width: Option<i32>) -> Result<(Vec<i32>, Vec<i32>)> {
        let live: Vec<(CellSpan, ChildHandle)> = self
            .live_entries()
            .filter_map(|(_, entry)| entry.handle.upgrade().map(|h| (entry.record.span, h)))
            .collect();

        let width_requirements: Vec<Requirement> = live
            .iter()
            .map(|(span, child)| Requirement {
                first: span.first_col,
                last: span.last_col,
                extent: child_minimum(child, |c| c.minimum_size().width),
            })
            .collect();
        let column_mins = propagate_minimums(
            Axis::Horizontal,
            &self.columns,
            self.cell_margin,
            &width_requirements,
        )?;

        let column_widths: Vec<i32> = match candidate_width {
            None => column_mins.clone(),
            Some(width) => {
                let mut columns = self.columns.clone();
                for (track, &min) in columns.iter_mut().zip(&column_mins) {
                    track.effective_min = min;
                }
                distribute(&mut columns, 0, width, self.border_margin, self.cell_margin);
                columns.iter().map(TrackParams::extent).collect()
            }
        };

        let height_requirements: Vec<Requirement> = live
            .iter()
            .map(|(span, child)| {
                let width = span
                    .cols()
                    .map(|col| column_widths[col])
                    .fold(0i32, i32::saturating_add)
                    .saturating_add(cell_margin_total(span.num_cols(), self.cell_margin));
                Requirement {
                    first: span.first_row,
                    last: span.last_row,
                    extent: child_minimum(child, |c| {
                        c.minimum_size()
                            .height
                            .max(c.minimum_usable_size(width).height)
                    }),
                }
            })
            .collect();
        let row_mins = propagate_minimums(
            Axis::Vertical,
            &self.rows,
            self.cell_margin,
            &height_requirements,
        )?;

        Ok((column_mins, row_mins))
    }

    fn place_children(&mut self) {
        let placements: Vec<(ChildHandle, PlacementRecord)> = self
            .live_entries()
            .filter_map(|(_, entry)| entry.handle.upgrade().map(|h| (h, entry.record)))
            .collect();

        for (child, record) in placements {
            let cell = self.span_rect(record.span);
            let target = if record.alignment.is_empty() {
                cell
            } else {
                match child.try_borrow() {
                    Ok(c) => aligned_bounds(&*c, cell, record.alignment, record.original),
                    Err(_) => cell,
                }
            };
            match child.try_borrow_mut() {
                Ok(mut c) => c.resize_and_reposition(target),
                Err(_) => {
                    warn!(bounds = %target, "child is already borrowed; skipping its placement");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    fn insert(
        &mut self,
        child: ChildHandle,
        span: CellSpan,
        alignment: Alignment,
    ) -> Result<ChildId> {
        span.validate()?;
        if let Some(existing) = self.child_id(&child) {
            return Err(GridError::DuplicateChild(existing));
        }
        self.purge_expired();
        if let Some(occupant) = self.occupant_within(span) {
            return Err(GridError::AttemptedOverwrite { span, occupant });
        }

        let original = match child.try_borrow() {
            Ok(c) => c.current_bounds(),
            Err(_) => {
                warn!("child is borrowed while being added; recording empty original bounds");
                Rect::default()
            }
        };
        self.set_dimensions(
            self.rows.len().max(span.last_row + 1),
            self.columns.len().max(span.last_col + 1),
        );

        let id = self.allocate(Entry {
            handle: Rc::downgrade(&child),
            record: PlacementRecord {
                span,
                alignment,
                original,
            },
        });
        for (row, col) in span.cells() {
            self.cells[row][col] = Some(id);
        }
        self.minimums_valid = false;
        debug!(child = %id, span = %span, "child added");
        Ok(id)
    }

    /// Remove a child's bookkeeping without re-solving.
    fn detach(&mut self, id: ChildId, policy: RemovalPolicy) -> Option<Entry> {
        let entry = self.release(id)?;
        if policy == RemovalPolicy::RestoreOriginal
            && let Some(child) = entry.handle.upgrade()
        {
            match child.try_borrow_mut() {
                Ok(mut c) => c.resize_and_reposition(entry.record.original),
                Err(_) => {
                    warn!(child = %id, "child is borrowed; original bounds not restored");
                }
            }
        }
        self.minimums_valid = false;
        Some(entry)
    }

    /// Drop entries whose child has been destroyed by its owner.
    fn purge_expired(&mut self) -> usize {
        let expired: Vec<ChildId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let entry = slot.entry.as_ref()?;
                (entry.handle.strong_count() == 0)
                    .then(|| ChildId::new(index as u32, slot.generation))
            })
            .collect();
        for &id in &expired {
            trace!(child = %id, "purging dropped child");
            self.release(id);
        }
        if !expired.is_empty() {
            self.minimums_valid = false;
        }
        expired.len()
    }

    fn allocate(&mut self, entry: Entry) -> ChildId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return ChildId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        ChildId::new(index, 0)
    }

    /// Clear a child's cells and free its slot.
    fn release(&mut self, id: ChildId) -> Option<Entry> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index() as u32);
        for (row, col) in entry.record.span.cells() {
            if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col))
                && *cell == Some(id)
            {
                *cell = None;
            }
        }
        Some(entry)
    }

    fn entry(&self, id: ChildId) -> Option<&Entry> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_ref())
            .filter(|entry| entry.handle.strong_count() > 0)
    }

    fn entry_mut(&mut self, id: ChildId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_mut())
            .filter(|entry| entry.handle.strong_count() > 0)
    }

    fn is_live(&self, id: ChildId) -> bool {
        self.entry(id).is_some()
    }

    fn live_entries(&self) -> impl Iterator<Item = (ChildId, &Entry)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let entry = slot.entry.as_ref()?;
            (entry.handle.strong_count() > 0)
                .then(|| (ChildId::new(index as u32, slot.generation), entry))
        })
    }

    fn occupant_within(&self, span: CellSpan) -> Option<ChildId> {
        span.cells()
            .filter_map(|(row, col)| self.cells.get(row).and_then(|r| r.get(col)).copied())
            .flatten()
            .find(|&id| self.is_live(id))
    }

    /// Resize the track vectors and the cell matrix (grow or truncate).
    fn set_dimensions(&mut self, rows: usize, columns: usize) {
        if rows == self.rows.len() && columns == self.columns.len() {
            return;
        }
        self.rows.resize(rows, TrackParams::default());
        self.columns.resize(columns, TrackParams::default());
        self.cells.resize(rows, Vec::new());
        for row in &mut self.cells {
            row.resize(columns, None);
        }
        self.minimums_valid = false;
    }

    fn tracks_mut(&mut self, axis: Axis) -> &mut [TrackParams] {
        match axis {
            Axis::Horizontal => &mut self.columns,
            Axis::Vertical => &mut self.rows,
        }
    }

    fn grow_axis(&mut self, axis: Axis, count: usize) {
        match axis {
            Axis::Horizontal => self.set_dimensions(self.rows.len(), self.columns.len().max(count)),
            Axis::Vertical => self.set_dimensions(self.rows.len().max(count), self.columns.len()),
        }
    }

    fn update_track(
        &mut self,
        axis: Axis,
        index: usize,
        apply: impl FnOnce(&mut TrackParams),
    ) -> Result<()> {
        self.grow_axis(axis, index + 1);
        apply(&mut self.tracks_mut(axis)[index]);
        self.minimums_valid = false;
        self.redo_layout()
    }

    fn update_tracks<T>(
        &mut self,
        axis: Axis,
        values: impl IntoIterator<Item = T>,
        apply: impl Fn(&mut TrackParams, T),
    ) -> Result<()> {
        let values: Vec<T> = values.into_iter().collect();
        self.grow_axis(axis, values.len());
        for (track, value) in self.tracks_mut(axis).iter_mut().zip(values) {
            apply(track, value);
        }
        self.minimums_valid = false;
        self.redo_layout()
    }

    /// Union of the cells covered by `span`.
    fn span_rect(&self, span: CellSpan) -> Rect {
        let first_col = &self.columns[span.first_col];
        let last_col = &self.columns[span.last_col];
        let first_row = &self.rows[span.first_row];
        let last_row = &self.rows[span.last_row];
        let right = last_col.origin.saturating_add(last_col.extent);
        let bottom = last_row.origin.saturating_add(last_row.extent);
        Rect::new(
            first_col.origin,
            first_row.origin,
            right - first_col.origin,
            bottom - first_row.origin,
        )
    }

    fn cached_minimum_size(&self) -> Size {
        self.extent_of(
            self.columns.iter().map(TrackParams::effective_min),
            self.rows.iter().map(TrackParams::effective_min),
        )
    }

    fn extent_of(
        &self,
        column_mins: impl IntoIterator<Item = i32>,
        row_mins: impl IntoIterator<Item = i32>,
    ) -> Size {
        Size::new(
            minimum_extent(column_mins, self.border_margin, self.cell_margin),
            minimum_extent(row_mins, self.border_margin, self.cell_margin),
        )
    }
}

/// Query a child's minimum, treating a child that is mid-update as needing nothing.
fn child_minimum(child: &ChildHandle, query: impl FnOnce(&dyn Placeable) -> i32) -> i32 {
    match child.try_borrow() {
        Ok(c) => query(&*c).max(0),
        Err(_) => {
            warn!("child is borrowed during minimum propagation; ignoring its minimum");
            0
        }
    }
}

/// Bounds for an aligned child inside `cell`.
///
/// The child keeps its original or minimum usable size (whichever is
/// larger), capped at its maximum, then shrunk to fit the cell. Axes without
/// an alignment flag fill the cell.
fn aligned_bounds(child: &dyn Placeable, cell: Rect, alignment: Alignment, original: Rect) -> Rect {
    let mut desired = original
        .size()
        .max(child.minimum_size())
        .max(child.minimum_usable_size(cell.width));
    if let Some(max) = child.maximum_size() {
        desired = desired.min(max);
    }
    let fitted = desired.min(cell.size()).max(Size::ZERO);

    let (x, width) = match alignment.horizontal() {
        Some(placement) => (
            cell.x + placement.offset(cell.width, fitted.width),
            fitted.width,
        ),
        None => (cell.x, cell.width),
    };
    let (y, height) = match alignment.vertical() {
        Some(placement) => (
            cell.y + placement.offset(cell.height, fitted.height),
            fitted.height,
        ),
        None => (cell.y, cell.height),
    };
    Rect::new(x, y, width, height)
}

/// Failures inside `Placeable` calls cannot be returned to the caller; the
/// nested layout keeps its previous geometry.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_nested_failure(err: &GridError) {
    error!(error = %err, "nested grid layout failed to solve");
}

impl Placeable for GridLayout {
    fn current_bounds(&self) -> Rect {
        self.bounds
    }

    fn minimum_size(&self) -> Size {
        self.total_minimum_size().unwrap_or_else(|err| {
            log_nested_failure(&err);
            self.cached_minimum_size()
        })
    }

    fn minimum_usable_size(&self, candidate_width: i32) -> Size {
        match self.solve_minimums(Some(candidate_width)) {
            Ok((column_mins, row_mins)) => self.extent_of(column_mins, row_mins),
            Err(err) => {
                log_nested_failure(&err);
                self.cached_minimum_size()
            }
        }
    }

    fn resize_and_reposition(&mut self, bounds: Rect) {
        if let Err(err) = self.on_container_resized(bounds.upper_left(), bounds.lower_right()) {
            log_nested_failure(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        bounds: Rect,
        min: Size,
    }

    impl Placeable for Fixed {
        fn current_bounds(&self) -> Rect {
            self.bounds
        }
        fn minimum_size(&self) -> Size {
            self.min
        }
        fn resize_and_reposition(&mut self, bounds: Rect) {
            self.bounds = bounds;
        }
    }

    fn fixed(w: i32, h: i32) -> Rc<RefCell<Fixed>> {
        Rc::new(RefCell::new(Fixed {
            bounds: Rect::default(),
            min: Size::new(w, h),
        }))
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut grid = GridLayout::with_dimensions(1, 1);
        let a = fixed(1, 1);
        let id_a = grid.add(a.clone(), 0, 0, Alignment::NONE).unwrap();
        assert!(grid.remove(id_a, RemovalPolicy::KeepCurrent).unwrap());

        let b = fixed(1, 1);
        let id_b = grid.add(b.clone(), 0, 0, Alignment::NONE).unwrap();
        assert_eq!(id_a.index(), id_b.index());
        assert_ne!(id_a, id_b);
        assert!(grid.child(id_a).is_none());
        assert_eq!(grid.child_alignment(id_a), Err(GridError::NoSuchChild(id_a)));
        assert!(!grid.remove(id_a, RemovalPolicy::KeepCurrent).unwrap());
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn dropped_child_is_purged_on_next_pass() {
        let mut grid = GridLayout::with_dimensions(1, 2);
        let a = fixed(30, 5);
        let id = grid.add(a.clone(), 0, 1, Alignment::NONE).unwrap();
        grid.redo_layout().unwrap();
        assert_eq!(grid.effective_column_minimum(1), Some(30));

        drop(a);
        assert_eq!(grid.cells()[0][1], None);
        assert!(grid.child(id).is_none());

        grid.redo_layout().unwrap();
        assert_eq!(grid.effective_column_minimum(1), Some(0));
        assert!(grid.slots[id.index()].entry.is_none());
        assert!(grid.cells[0][1].is_none());
    }

    #[test]
    fn dropped_child_does_not_block_add() {
        let mut grid = GridLayout::with_dimensions(1, 1);
        let a = fixed(1, 1);
        grid.add(a.clone(), 0, 0, Alignment::NONE).unwrap();
        drop(a);
        let b = fixed(1, 1);
        assert!(grid.add(b.clone(), 0, 0, Alignment::NONE).is_ok());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut grid = GridLayout::with_dimensions(2, 2);
        let a = fixed(1, 1);
        let id = grid.add(a.clone(), 0, 0, Alignment::NONE).unwrap();
        assert_eq!(
            grid.add(a.clone(), 1, 1, Alignment::NONE),
            Err(GridError::DuplicateChild(id))
        );
        assert_eq!(grid.child_id(&a), Some(id));
    }

    #[test]
    fn solver_returns_to_idle() {
        let mut grid = GridLayout::with_dimensions(2, 2);
        grid.add(fixed(5, 5), 0, 0, Alignment::NONE).unwrap();
        assert_eq!(grid.solver_state(), SolverState::Idle);
        assert!(grid.notifier().pending().is_empty());
    }

    #[test]
    fn aligned_bounds_centers_and_clamps() {
        let child = Fixed {
            bounds: Rect::default(),
            min: Size::new(20, 50),
        };
        let cell = Rect::new(10, 10, 100, 30);
        let placed = aligned_bounds(
            &child,
            cell,
            Alignment::CENTER | Alignment::VCENTER,
            Rect::default(),
        );
        assert_eq!(placed, Rect::new(50, 10, 20, 30));
    }

    #[test]
    fn aligned_bounds_fills_unflagged_axis() {
        let child = Fixed {
            bounds: Rect::default(),
            min: Size::new(20, 10),
        };
        let cell = Rect::new(0, 0, 100, 40);
        let placed = aligned_bounds(&child, cell, Alignment::RIGHT, Rect::default());
        assert_eq!(placed, Rect::new(80, 0, 20, 40));
    }
}
