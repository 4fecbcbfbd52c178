#![forbid(unsafe_code)]

//! Serializable layout parameters.
//!
//! A [`GridConfig`] captures everything about a layout except its children:
//! dimensions, margins, per-track stretch and minimums, and the outline
//! debug flag. [`GridLayout::with_config`](crate::GridLayout::with_config)
//! builds a layout from one and [`GridLayout::config`](crate::GridLayout::config)
//! snapshots one back out.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Row count. Grows to fit the per-row vectors if they are longer.
    pub rows: usize,
    /// Column count. Grows to fit the per-column vectors if they are longer.
    pub columns: usize,
    pub border_margin: i32,
    pub cell_margin: i32,
    pub row_stretches: Vec<f64>,
    pub column_stretches: Vec<f64>,
    pub row_minimums: Vec<i32>,
    pub column_minimums: Vec<i32>,
    pub render_outline: bool,
}

impl GridConfig {
    /// A `rows` x `columns` grid with default parameters.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Self::default()
        }
    }

    /// Set the border margin.
    #[must_use]
    pub fn border_margin(mut self, margin: i32) -> Self {
        self.border_margin = margin;
        self
    }

    /// Set the cell margin.
    #[must_use]
    pub fn cell_margin(mut self, margin: i32) -> Self {
        self.cell_margin = margin;
        self
    }

    /// Set row stretch weights, starting at row 0.
    #[must_use]
    pub fn row_stretches(mut self, stretches: impl IntoIterator<Item = f64>) -> Self {
        self.row_stretches = stretches.into_iter().collect();
        self
    }

    /// Set column stretch weights, starting at column 0.
    #[must_use]
    pub fn column_stretches(mut self, stretches: impl IntoIterator<Item = f64>) -> Self {
        self.column_stretches = stretches.into_iter().collect();
        self
    }

    /// Set declared row minimums, starting at row 0.
    #[must_use]
    pub fn row_minimums(mut self, minimums: impl IntoIterator<Item = i32>) -> Self {
        self.row_minimums = minimums.into_iter().collect();
        self
    }

    /// Set declared column minimums, starting at column 0.
    #[must_use]
    pub fn column_minimums(mut self, minimums: impl IntoIterator<Item = i32>) -> Self {
        self.column_minimums = minimums.into_iter().collect();
        self
    }

    /// Enable the outline debug flag.
    #[must_use]
    pub fn render_outline(mut self, enabled: bool) -> Self {
        self.render_outline = enabled;
        self
    }

    /// Effective row count.
    pub fn row_count(&self) -> usize {
        self.rows
            .max(self.row_stretches.len())
            .max(self.row_minimums.len())
    }

    /// Effective column count.
    pub fn column_count(&self) -> usize {
        self.columns
            .max(self.column_stretches.len())
            .max(self.column_minimums.len())
    }

    /// Reject negative margins.
    pub fn validate(&self) -> Result<()> {
        for value in [self.border_margin, self.cell_margin] {
            if value < 0 {
                return Err(GridError::InvalidMargin { value });
            }
        }
        Ok(())
    }
}
