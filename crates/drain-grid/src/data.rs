// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dense row-major storage for one partition.

use std::ops::{Index, IndexMut};

use crate::{Cell, GridError, Shape};

/// Cell values of one partition, stored densely in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionData<T> {
    shape: Shape,
    cells: Vec<T>,
}

impl<T> PartitionData<T> {
    /// Wraps a row-major buffer. Fails unless `cells.len() == shape.nr_cells()`.
    pub fn from_vec(shape: Shape, cells: Vec<T>) -> Result<Self, GridError> {
        if cells.len() != shape.nr_cells() {
            return Err(GridError::LengthMismatch {
                expected: shape.nr_cells(),
                found: cells.len(),
            });
        }
        Ok(Self { shape, cells })
    }

    /// Extent of the partition.
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Values in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Consumes the buffer, returning the row-major values.
    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }

    /// Value at `cell`, or `None` when outside the partition.
    pub fn get(&self, cell: Cell) -> Option<&T> {
        if self.shape.contains(cell) {
            self.cells.get(self.shape.linear_index(cell))
        } else {
            None
        }
    }

    /// Cells paired with their values, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        self.shape.cells().zip(self.cells.iter())
    }

    /// Applies `f` to every value.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> PartitionData<U> {
        PartitionData {
            shape: self.shape,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> PartitionData<T> {
    /// A partition with every cell set to `value`.
    pub fn filled(shape: Shape, value: T) -> Self {
        Self {
            shape,
            cells: vec![value; shape.nr_cells()],
        }
    }
}

impl<T> Index<Cell> for PartitionData<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &T {
        &self.cells[self.shape.linear_index(cell)]
    }
}

impl<T> IndexMut<Cell> for PartitionData<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        &mut self.cells[self.shape.linear_index(cell)]
    }
}
