// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Whole-array container made of shared partitions.

use std::sync::Arc;

use crate::{Cell, GridError, PartitionData, PartitionLayout, Shape};

/// A 2D array cut into partitions.
///
/// Partitions are reference-counted, so cloning the array or handing one
/// partition to a worker task never copies cell data.
#[derive(Debug, Clone)]
pub struct PartitionedArray<T> {
    layout: PartitionLayout,
    partitions: Vec<Arc<PartitionData<T>>>,
}

impl<T> PartitionedArray<T> {
    /// Assembles an array from one buffer per partition, in layout order.
    pub fn from_partitions(
        layout: PartitionLayout,
        partitions: Vec<PartitionData<T>>,
    ) -> Result<Self, GridError> {
        if partitions.len() != layout.nr_partitions() {
            return Err(GridError::PartitionCount {
                expected: layout.nr_partitions(),
                found: partitions.len(),
            });
        }
        for (partition, data) in partitions.iter().enumerate() {
            let expected = layout.partition_shape(partition);
            if data.shape() != expected {
                return Err(GridError::PartitionShape {
                    partition,
                    expected,
                    found: data.shape(),
                });
            }
        }
        Ok(Self {
            layout,
            partitions: partitions.into_iter().map(Arc::new).collect(),
        })
    }

    /// Assembles an array from one row-major value list per partition.
    pub fn from_partition_values(
        array_shape: Shape,
        partition_shape: Shape,
        values: Vec<Vec<T>>,
    ) -> Result<Self, GridError> {
        let layout = PartitionLayout::new(array_shape, partition_shape)?;
        let partitions = values
            .into_iter()
            .enumerate()
            .map(|(partition, cells)| {
                PartitionData::from_vec(layout.partition_shape(partition), cells)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_partitions(layout, partitions)
    }

    /// The tiling of this array.
    pub const fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    /// Extent of the whole array.
    pub const fn shape(&self) -> Shape {
        self.layout.array_shape()
    }

    /// Number of partitions.
    pub fn nr_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Shared handle to partition `index`.
    pub fn partition(&self, index: usize) -> Option<&Arc<PartitionData<T>>> {
        self.partitions.get(index)
    }

    /// All partitions in layout order.
    pub fn partitions(&self) -> &[Arc<PartitionData<T>>] {
        &self.partitions
    }

    /// Value at global `cell`.
    pub fn get(&self, cell: Cell) -> Option<&T> {
        let (partition, local) = self.layout.locate(cell)?;
        self.partitions.get(partition)?.get(local)
    }

    /// Applies `f` to every value, keeping the layout.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PartitionedArray<U> {
        PartitionedArray {
            layout: self.layout,
            partitions: self
                .partitions
                .iter()
                .map(|data| Arc::new(data.map(&mut f)))
                .collect(),
        }
    }
}

impl<T: Clone> PartitionedArray<T> {
    /// An array with every cell set to `value`.
    pub fn filled(array_shape: Shape, partition_shape: Shape, value: T) -> Result<Self, GridError> {
        let layout = PartitionLayout::new(array_shape, partition_shape)?;
        let partitions = (0..layout.nr_partitions())
            .map(|partition| {
                Arc::new(PartitionData::filled(
                    layout.partition_shape(partition),
                    value.clone(),
                ))
            })
            .collect();
        Ok(Self { layout, partitions })
    }

    /// Cuts a global row-major buffer into partitions.
    pub fn from_dense(
        array_shape: Shape,
        partition_shape: Shape,
        cells: &[T],
    ) -> Result<Self, GridError> {
        if cells.len() != array_shape.nr_cells() {
            return Err(GridError::LengthMismatch {
                expected: array_shape.nr_cells(),
                found: cells.len(),
            });
        }
        let layout = PartitionLayout::new(array_shape, partition_shape)?;
        let partitions = (0..layout.nr_partitions())
            .map(|partition| {
                let shape = layout.partition_shape(partition);
                let origin = layout.offset(partition);
                let values = shape
                    .cells()
                    .map(|local| {
                        let global = Cell::new(origin.row + local.row, origin.col + local.col);
                        cells[array_shape.linear_index(global)].clone()
                    })
                    .collect();
                PartitionData::from_vec(shape, values)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_partitions(layout, partitions)
    }

    /// Copies the array into one global row-major buffer.
    pub fn to_dense(&self) -> Vec<T> {
        let shape = self.shape();
        let mut dense: Vec<Option<T>> = vec![None; shape.nr_cells()];
        for (partition, data) in self.partitions.iter().enumerate() {
            let origin = self.layout.offset(partition);
            for (local, value) in data.iter() {
                let global = Cell::new(origin.row + local.row, origin.col + local.col);
                dense[shape.linear_index(global)] = Some(value.clone());
            }
        }
        // Every global cell belongs to exactly one partition.
        dense.into_iter().flatten().collect()
    }

    /// One row-major value list per partition, in layout order.
    pub fn to_partition_values(&self) -> Vec<Vec<T>> {
        self.partitions
            .iter()
            .map(|data| data.as_slice().to_vec())
            .collect()
    }
}
