// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Material element types and per-cell arguments.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::sync::Arc;

use drain_grid::{Cell, NoData, PartitionData, PartitionLayout, PartitionedArray};

use crate::RouteError;

/// Numeric element type of routed material. No-data is NaN.
pub trait Material:
    NoData
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Send
    + Sync
    + fmt::Debug
    + 'static
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
}

impl Material for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
}

impl Material for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
}

/// A value broadcast to every cell.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Scalar<M>(pub M);

impl<M: Copy> Scalar<M> {
    /// Wraps `value`.
    pub const fn new(value: M) -> Self {
        Self(value)
    }

    /// The broadcast value.
    pub const fn get(self) -> M {
        self.0
    }
}

/// A per-cell input: a partitioned array, a broadcast [`Scalar`], or a bare
/// value. Operations take `impl Into<Argument<M>>`, so all three can be
/// passed directly.
#[derive(Debug, Clone)]
pub enum Argument<M> {
    /// One value per cell. Must be tiled like the flow-direction array.
    Array(PartitionedArray<M>),
    /// The same value everywhere.
    Scalar(Scalar<M>),
    /// The same value everywhere, given as a bare value.
    Value(M),
}

impl<M: Material> Argument<M> {
    /// Fails unless an array argument is tiled exactly like `layout`.
    pub(crate) fn check_layout(
        &self,
        argument: &'static str,
        layout: &PartitionLayout,
    ) -> Result<(), RouteError> {
        match self {
            Self::Array(array) if array.layout() != layout => Err(RouteError::LayoutMismatch {
                argument,
                expected: *layout,
                found: *array.layout(),
            }),
            _ => Ok(()),
        }
    }

    /// The values visible to partition `partition`.
    pub(crate) fn cells(&self, partition: usize) -> CellValues<M> {
        match self {
            Self::Array(array) => array
                .partition(partition)
                .map_or(CellValues::Uniform(M::NO_DATA), |data| {
                    CellValues::Cells(Arc::clone(data))
                }),
            Self::Scalar(scalar) => CellValues::Uniform(scalar.get()),
            Self::Value(value) => CellValues::Uniform(*value),
        }
    }
}

impl<M> From<PartitionedArray<M>> for Argument<M> {
    fn from(array: PartitionedArray<M>) -> Self {
        Self::Array(array)
    }
}

impl<M: Clone> From<&PartitionedArray<M>> for Argument<M> {
    fn from(array: &PartitionedArray<M>) -> Self {
        Self::Array(array.clone())
    }
}

impl<M> From<Scalar<M>> for Argument<M> {
    fn from(scalar: Scalar<M>) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<f32> for Argument<f32> {
    fn from(value: f32) -> Self {
        Self::Value(value)
    }
}

impl From<f64> for Argument<f64> {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

/// Partition-local view of an [`Argument`].
#[derive(Debug, Clone)]
pub(crate) enum CellValues<M> {
    Cells(Arc<PartitionData<M>>),
    Uniform(M),
}

impl<M: Material> CellValues<M> {
    pub(crate) fn at(&self, cell: Cell) -> M {
        match self {
            Self::Cells(data) => data[cell],
            Self::Uniform(value) => *value,
        }
    }
}
