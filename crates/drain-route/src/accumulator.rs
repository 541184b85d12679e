// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The contract between the traversal and a cell-accumulation policy.
//!
//! The traversal decides *when* a cell is processed; the policy decides
//! *what* happens to the cell's values. A policy sees three kinds of
//! events, always for a cell whose upstream contributions are either all
//! applied (external inflow) or being applied one at a time (merges):
//!
//! 1. [`accumulate_external_inflow`](CellAccumulator::accumulate_external_inflow)
//!    once per cell, after every upstream merge, just before the cell's
//!    outflow is read;
//! 2. [`accumulate_downstream`](CellAccumulator::accumulate_downstream) for
//!    each upstream cell in the same partition;
//! 3. [`accumulate_received`](CellAccumulator::accumulate_received) for each
//!    upstream cell in a neighbouring partition.
//!
//! Merges into a cell are delivered together once its last contribution has
//! arrived, ordered by the flow direction they arrive along
//! ([`Direction::ALL`](drain_grid::Direction::ALL) order). A floating-point
//! policy therefore gives bit-identical results however the partition tasks
//! are scheduled.
//!
//! Cells with a no-data flow direction get
//! [`mark_no_data`](CellAccumulator::mark_no_data) before routing starts and
//! no other event changes them.

use std::fmt;

use drain_grid::{Cell, Shape};

/// How a stream was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    /// At a cell without upstream contributions.
    Ridge,
    /// At a cell whose last contribution arrived from a neighbouring
    /// partition.
    PartitionInput,
}

/// Where a stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamExit {
    /// At a sink.
    Sink(Cell),
    /// At a cell draining out of the partition; its value was sent.
    PartitionOutput(Cell),
    /// At a junction still waiting for other contributions. The cell named
    /// is the junction, downstream of the last cell processed.
    Junction(Cell),
    /// At a cell with a no-data flow direction.
    NoData(Cell),
}

/// Out-of-domain inputs seen by a policy in one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomainReport {
    /// Number of offending cells.
    pub count: usize,
    /// First offending cell.
    pub first: Option<Cell>,
}

impl DomainReport {
    /// Records an offending cell.
    pub fn record(&mut self, cell: Cell) {
        self.count += 1;
        self.first.get_or_insert(cell);
    }

    /// `true` when nothing was recorded.
    pub const fn is_clean(&self) -> bool {
        self.count == 0
    }
}

/// Per-partition state of one accumulation policy.
pub trait CellAccumulator: Send + 'static {
    /// Value sent across partition boundaries.
    type Value: Copy + Send + fmt::Debug + 'static;
    /// Finished result of one partition.
    type Output: Send + 'static;

    /// Folds the cell's own external inflow into its state.
    fn accumulate_external_inflow(&mut self, cell: Cell);

    /// Merges the finished outflow of `from` into its downstream cell `to`.
    fn accumulate_downstream(&mut self, from: Cell, to: Cell);

    /// Merges a value received from a neighbouring partition into `to`.
    fn accumulate_received(&mut self, value: Self::Value, to: Cell);

    /// Current outflow of `cell`.
    fn outflow(&self, cell: Cell) -> Self::Value;

    /// Marks every output of `cell` as no-data.
    fn mark_no_data(&mut self, cell: Cell);

    /// Called before a stream starts at `cell`.
    fn enter_stream(&mut self, _cell: Cell, _origin: StreamOrigin) {}

    /// Called after a stream started at `start` stopped.
    fn leave_stream(&mut self, _start: Cell, _origin: StreamOrigin, _exit: StreamExit) {}

    /// Out-of-domain inputs seen so far.
    fn domain_report(&self) -> DomainReport {
        DomainReport::default()
    }

    /// Consumes the state, returning the partition's result.
    fn into_output(self) -> Self::Output;
}

/// Builds the [`CellAccumulator`] of each partition for one operation.
pub trait Accumulation: Send + Sync + 'static {
    /// Per-partition state.
    type Accumulator: CellAccumulator;

    /// Operation name used in channel names, spans and errors.
    fn name(&self) -> &'static str;

    /// State for partition `partition` of extent `shape`.
    fn accumulator(&self, partition: usize, shape: Shape) -> Self::Accumulator;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_report_keeps_first_cell() {
        let mut report = DomainReport::default();
        assert!(report.is_clean());
        report.record(Cell::new(2, 1));
        report.record(Cell::new(0, 0));
        assert_eq!(report.count, 2);
        assert_eq!(report.first, Some(Cell::new(2, 1)));
    }
}
