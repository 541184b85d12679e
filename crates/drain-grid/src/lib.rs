// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Partitioned 2D grid addressing for the drain router.
//!
//! A logical array of `rows × cols` cells is cut into rectangular tiles
//! (partitions). All tiles share one nominal shape; the last partition row
//! and column are clipped to the array extent. The router processes each
//! tile in its own task, so everything here is about addressing: which tile
//! owns a cell, where a tile starts, which tiles are its eight neighbours.
//!
//! # Modules
//!
//! - [`shape`] - `Shape` and `Cell`
//! - [`direction`] - compass `Direction` and D8 `FlowDirection`
//! - [`layout`] - `PartitionLayout` (tile sizes, offsets, neighbour topology)
//! - [`data`] - `PartitionData`, a dense row-major tile buffer
//! - [`array`] - `PartitionedArray`, the whole-array container
//! - [`no_data`] - the `NoData` element marker
#![forbid(unsafe_code)]

pub mod array;
pub mod data;
pub mod direction;
pub mod layout;
pub mod no_data;
pub mod shape;

pub use array::PartitionedArray;
pub use data::PartitionData;
pub use direction::{Direction, FlowDirection};
pub use layout::PartitionLayout;
pub use no_data::NoData;
pub use shape::{Cell, Shape};

use thiserror::Error;

/// Errors raised while building grids and partitioned arrays.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A shape had zero rows or zero columns.
    #[error("shape {0} is empty")]
    EmptyShape(Shape),
    /// A buffer did not hold exactly one element per cell.
    #[error("expected {expected} elements, found {found}")]
    LengthMismatch {
        /// Number of cells the shape requires.
        expected: usize,
        /// Number of elements supplied.
        found: usize,
    },
    /// The number of partitions supplied does not match the layout.
    #[error("layout has {expected} partitions, found {found}")]
    PartitionCount {
        /// Partitions in the layout.
        expected: usize,
        /// Partitions supplied.
        found: usize,
    },
    /// A partition buffer does not have the shape its layout slot requires.
    #[error("partition {partition} has shape {found}, layout requires {expected}")]
    PartitionShape {
        /// Linear partition index.
        partition: usize,
        /// Shape required by the layout.
        expected: Shape,
        /// Shape of the supplied buffer.
        found: Shape,
    },
}
