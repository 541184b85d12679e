// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Extents and cell coordinates.

use std::fmt;

/// Extent of a 2D block of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl Shape {
    /// Creates a shape of `rows × cols` cells.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub const fn nr_cells(self) -> usize {
        self.rows * self.cols
    }

    /// `true` when either extent is zero.
    pub const fn is_empty(self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// `true` when `cell` lies inside this shape.
    pub const fn contains(self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Row-major linear index of `cell`.
    pub const fn linear_index(self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    pub const fn cell_at(self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    /// The cell reached from `cell` by moving `(d_row, d_col)`, if it stays
    /// inside the shape.
    pub fn offset(self, cell: Cell, (d_row, d_col): (isize, isize)) -> Option<Cell> {
        let row = cell.row.checked_add_signed(d_row)?;
        let col = cell.col.checked_add_signed(d_col)?;
        let target = Cell::new(row, col);
        self.contains(target).then_some(target)
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Zero-based `(row, col)` coordinate of a cell.
///
/// Whether the coordinate is partition-local or global depends on context;
/// the router works in partition-local coordinates throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Cell {
    /// Creates a cell coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_stays_inside() {
        let shape = Shape::new(3, 4);
        assert_eq!(shape.offset(Cell::new(1, 1), (-1, 1)), Some(Cell::new(0, 2)));
        assert_eq!(shape.offset(Cell::new(0, 0), (-1, 0)), None);
        assert_eq!(shape.offset(Cell::new(2, 3), (0, 1)), None);
        assert_eq!(shape.offset(Cell::new(2, 3), (1, 0)), None);
    }

    #[test]
    fn cells_are_row_major() {
        let shape = Shape::new(2, 3);
        let cells: Vec<_> = shape.cells().collect();
        assert_eq!(cells.len(), 6);
        for (index, cell) in cells.iter().enumerate() {
            assert_eq!(shape.linear_index(*cell), index);
            assert_eq!(shape.cell_at(index), *cell);
        }
    }
}
