//! Geometry types for character grids.

use serde::{Deserialize, Serialize};

/// Dimensions of a character grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of rows
    pub rows: u16,
    /// Number of columns
    pub cols: u16,
}

impl Dimensions {
    /// Create new dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Total cell count (rows * cols).
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Check whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
