//! Grid topology: positions, rows, columns and adjacency.
//!
//! Positions are flat indices in row-major order, so a 4×5 grid spans
//! `0..20` with row `i / 5` and column `i % 5`. All neighbour queries return
//! positions in ascending order except [`GridTopology::adjacent`], which uses
//! the fixed order up, left, right, down.
//!
//! # Example
//!
//! ```
//! use reelgarden_core::grid::{GridPosition, GridTopology};
//!
//! let grid = GridTopology::new(4, 5).unwrap();
//! let neighbours = grid.adjacent(GridPosition::new(4));
//! // Index 4 sits on the right edge: no right neighbour.
//! assert_eq!(neighbours, vec![GridPosition::new(3), GridPosition::new(9)]);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{GridConfig, DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::error::{EngineError, EngineResult};

/// A cell index on the grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPosition(usize);

impl GridPosition {
    /// Creates a position from a flat index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the flat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for GridPosition {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// Rows × columns grid dimensions with neighbour lookups.
///
/// Deserialization goes through [`GridTopology::new`], so an empty grid is
/// rejected rather than loaded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridConfig")]
pub struct GridTopology {
    rows: usize,
    columns: usize,
}

impl GridTopology {
    /// Creates a topology.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGrid`] if either dimension is zero.
    pub fn new(rows: usize, columns: usize) -> EngineResult<Self> {
        if rows == 0 || columns == 0 {
            return Err(EngineError::InvalidGrid { rows, columns });
        }
        Ok(Self { rows, columns })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.columns
    }

    /// Always false: a valid topology has at least one cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the position lies on the grid.
    #[must_use]
    pub const fn contains(&self, pos: GridPosition) -> bool {
        pos.0 < self.len()
    }

    /// Row of a position.
    #[must_use]
    pub const fn row(&self, pos: GridPosition) -> usize {
        pos.0 / self.columns
    }

    /// Column of a position.
    #[must_use]
    pub const fn column(&self, pos: GridPosition) -> usize {
        pos.0 % self.columns
    }

    /// Iterates every position in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> {
        (0..self.len()).map(GridPosition)
    }

    /// The up to four orthogonal neighbours, ordered up, left, right, down.
    ///
    /// Left and right neighbours never cross a row boundary.
    #[must_use]
    pub fn adjacent(&self, pos: GridPosition) -> Vec<GridPosition> {
        if !self.contains(pos) {
            return Vec::new();
        }
        let i = pos.0;
        let column = self.column(pos);
        let mut out = Vec::with_capacity(4);
        if i >= self.columns {
            out.push(GridPosition(i - self.columns));
        }
        if column > 0 {
            out.push(GridPosition(i - 1));
        }
        if column + 1 < self.columns {
            out.push(GridPosition(i + 1));
        }
        if i + self.columns < self.len() {
            out.push(GridPosition(i + self.columns));
        }
        out
    }

    /// Every other cell in the same row.
    #[must_use]
    pub fn same_row(&self, pos: GridPosition) -> Vec<GridPosition> {
        if !self.contains(pos) {
            return Vec::new();
        }
        let start = self.row(pos) * self.columns;
        (start..start + self.columns)
            .filter(|&i| i != pos.0)
            .map(GridPosition)
            .collect()
    }

    /// Every other cell in the same column.
    #[must_use]
    pub fn same_column(&self, pos: GridPosition) -> Vec<GridPosition> {
        if !self.contains(pos) {
            return Vec::new();
        }
        (self.column(pos)..self.len())
            .step_by(self.columns)
            .filter(|&i| i != pos.0)
            .map(GridPosition)
            .collect()
    }

    /// Returns true if the position is one of the four grid corners.
    #[must_use]
    pub const fn is_corner(&self, pos: GridPosition) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let row = self.row(pos);
        let column = self.column(pos);
        (row == 0 || row + 1 == self.rows) && (column == 0 || column + 1 == self.columns)
    }
}

impl TryFrom<GridConfig> for GridTopology {
    type Error = EngineError;

    fn try_from(config: GridConfig) -> EngineResult<Self> {
        Self::new(config.rows, config.columns)
    }
}

impl Default for GridTopology {
    /// The standard 4×5 grid.
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
        }
    }
}
