// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Partition layout: how an array is cut into tiles.

use crate::{Cell, Direction, GridError, Shape};

/// Tiling of an array into partitions.
///
/// Partitions are numbered row-major over the partition grid. Every
/// partition has the nominal `partition_shape` except those in the last
/// partition row or column, which are clipped to the array extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionLayout {
    array_shape: Shape,
    partition_shape: Shape,
    shape_in_partitions: Shape,
}

impl PartitionLayout {
    /// Creates a layout. Both shapes must be non-empty; a partition shape
    /// larger than the array is clipped to it.
    pub fn new(array_shape: Shape, partition_shape: Shape) -> Result<Self, GridError> {
        if array_shape.is_empty() {
            return Err(GridError::EmptyShape(array_shape));
        }
        if partition_shape.is_empty() {
            return Err(GridError::EmptyShape(partition_shape));
        }
        let partition_shape = Shape::new(
            partition_shape.rows.min(array_shape.rows),
            partition_shape.cols.min(array_shape.cols),
        );
        let shape_in_partitions = Shape::new(
            array_shape.rows.div_ceil(partition_shape.rows),
            array_shape.cols.div_ceil(partition_shape.cols),
        );
        Ok(Self {
            array_shape,
            partition_shape,
            shape_in_partitions,
        })
    }

    /// Extent of the whole array.
    pub const fn array_shape(&self) -> Shape {
        self.array_shape
    }

    /// Number of partitions along each axis.
    pub const fn shape_in_partitions(&self) -> Shape {
        self.shape_in_partitions
    }

    /// Total number of partitions.
    pub const fn nr_partitions(&self) -> usize {
        self.shape_in_partitions.nr_cells()
    }

    /// Position of partition `index` in the partition grid.
    pub const fn position(&self, index: usize) -> Cell {
        self.shape_in_partitions.cell_at(index)
    }

    /// Linear index of the partition at `position`.
    pub const fn index(&self, position: Cell) -> usize {
        self.shape_in_partitions.linear_index(position)
    }

    /// Global cell at the origin of partition `index`.
    pub const fn offset(&self, index: usize) -> Cell {
        let position = self.position(index);
        Cell::new(
            position.row * self.partition_shape.rows,
            position.col * self.partition_shape.cols,
        )
    }

    /// Actual extent of partition `index`.
    pub fn partition_shape(&self, index: usize) -> Shape {
        let origin = self.offset(index);
        Shape::new(
            self.partition_shape
                .rows
                .min(self.array_shape.rows - origin.row),
            self.partition_shape
                .cols
                .min(self.array_shape.cols - origin.col),
        )
    }

    /// Index of the neighbouring partition in `direction`; `None` at the
    /// array edge.
    pub fn neighbour(&self, index: usize, direction: Direction) -> Option<usize> {
        self.shape_in_partitions
            .offset(self.position(index), direction.offset())
            .map(|position| self.index(position))
    }

    /// Partition owning global `cell` and the cell's partition-local
    /// coordinate.
    pub fn locate(&self, cell: Cell) -> Option<(usize, Cell)> {
        if !self.array_shape.contains(cell) {
            return None;
        }
        let position = Cell::new(
            cell.row / self.partition_shape.rows,
            cell.col / self.partition_shape.cols,
        );
        let local = Cell::new(
            cell.row % self.partition_shape.rows,
            cell.col % self.partition_shape.cols,
        );
        Some((self.index(position), local))
    }
}
