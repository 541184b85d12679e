// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors reported by routing operations.

use std::time::Duration;

use drain_grid::{Cell, Direction, GridError, PartitionLayout};
use thiserror::Error;

/// Failure of a routing operation.
///
/// Missing data never produces an error; it propagates as no-data through
/// the outputs. Errors are reserved for structural problems (layouts that
/// do not line up, drainage networks that are not acyclic, lost messages)
/// and for out-of-domain inputs when the router is configured to reject
/// them.
#[derive(Debug, Error)]
pub enum RouteError {
    /// An argument array is tiled differently from the flow-direction array.
    #[error("argument `{argument}` has layout {found:?}, expected {expected:?}")]
    LayoutMismatch {
        /// Which argument.
        argument: &'static str,
        /// Layout of the flow-direction array.
        expected: PartitionLayout,
        /// Layout of the argument.
        found: PartitionLayout,
    },
    /// Output assembly failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// A receive did not complete within the configured stall timeout.
    #[error(
        "partition {partition}: no {stage} message from the {direction} neighbour within {waited:?} ({pending} cell(s) pending)"
    )]
    Stalled {
        /// Partition that was waiting.
        partition: usize,
        /// Direction of the silent neighbour.
        direction: Direction,
        /// `"registration"` or `"material"`.
        stage: &'static str,
        /// Input cells still expected.
        pending: usize,
        /// How long the receive waited.
        waited: Duration,
    },
    /// A neighbour closed its channel while input was still expected.
    #[error(
        "partition {partition}: {stage} channel from the {direction} neighbour closed with {pending} cell(s) pending"
    )]
    ChannelClosed {
        /// Partition that was waiting.
        partition: usize,
        /// Direction of the neighbour.
        direction: Direction,
        /// `"registration"` or `"material"`.
        stage: &'static str,
        /// Input cells still expected.
        pending: usize,
    },
    /// The neighbour that should receive a value no longer listens.
    #[error("partition {partition}: the {direction} neighbour stopped receiving")]
    NeighbourGone {
        /// Sending partition.
        partition: usize,
        /// Direction of the neighbour.
        direction: Direction,
    },
    /// A message addressed a boundary cell that was not registered as input,
    /// or whose inputs were all consumed already.
    #[error("partition {partition}: unexpected input for cell {cell} from the {direction} neighbour")]
    UnexpectedInput {
        /// Receiving partition.
        partition: usize,
        /// Direction of the sender.
        direction: Direction,
        /// Partition-local cell named by the message.
        cell: Cell,
    },
    /// A message named a boundary index outside the receiving partition.
    #[error("partition {partition}: boundary index {index} from the {direction} neighbour is out of range")]
    InvalidBoundaryIndex {
        /// Receiving partition.
        partition: usize,
        /// Direction of the sender.
        direction: Direction,
        /// The offending index.
        index: usize,
    },
    /// Cells whose inflow count never reached zero, or outputs never sent,
    /// after all input was consumed. The drainage network contains a cycle.
    #[error(
        "partition {partition}: {unresolved} cell(s) never became ready (first at {first}); the drainage network is not acyclic"
    )]
    Unresolved {
        /// Partition with unresolved cells.
        partition: usize,
        /// Number of unresolved cells.
        unresolved: usize,
        /// First unresolved cell in row-major order.
        first: Cell,
    },
    /// An input value lies outside the operation's domain and the router is
    /// configured to reject such values.
    #[error("partition {partition}: {operation} input at cell {cell} is outside the domain")]
    OutOfDomain {
        /// Operation name.
        operation: &'static str,
        /// Partition containing the cell.
        partition: usize,
        /// First offending partition-local cell.
        cell: Cell,
    },
    /// A partition task panicked or was cancelled.
    #[error("partition {partition}: task failed: {reason}")]
    TaskFailed {
        /// Partition whose task failed.
        partition: usize,
        /// Panic or cancellation description.
        reason: String,
    },
    /// The router configuration is unusable.
    #[error("invalid router configuration: {0}")]
    InvalidConfig(String),
}

impl RouteError {
    /// `true` for failures that are a consequence of another partition
    /// failing first (its endpoints were dropped).
    pub const fn is_secondary(&self) -> bool {
        matches!(self, Self::ChannelClosed { .. } | Self::NeighbourGone { .. })
    }
}
