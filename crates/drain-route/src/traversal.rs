// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stream traversal within one partition.

use std::sync::Arc;

use drain_grid::{Cell, Direction, FlowDirection, NoData, PartitionData};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::accumulator::{CellAccumulator, StreamExit, StreamOrigin};
use crate::boundary::{step, Step};
use crate::channel::Outbox;
use crate::RouteError;

/// Material message: boundary index in the receiver's frame, flow direction
/// of the sending cell and value.
pub(crate) type Message<V> = (usize, Direction, V);

/// An upstream contribution held at a junction until all have arrived.
#[derive(Debug, Clone, Copy)]
enum Contribution<V> {
    /// Finished outflow of an upstream cell in this partition.
    Local(Cell),
    /// Value received from a neighbouring partition.
    Received(V),
}

/// Contributions of one junction, indexed by the flow direction they arrive
/// along.
type Contributions<V> = [Option<Contribution<V>>; 8];

/// Everything one partition mutates while routing: the policy state, the
/// remaining inflow counts, the output cells not yet sent and the send
/// endpoints. Owned by the partition task; shared with its monitors behind
/// one mutex.
///
/// A junction merges its contributions in [`Direction::ALL`] order once the
/// last one is in, so results never depend on arrival order.
pub(crate) struct Traversal<A: CellAccumulator> {
    partition: usize,
    flow_direction: Arc<PartitionData<FlowDirection>>,
    inflow_count: PartitionData<u8>,
    waiting: FxHashMap<Cell, Contributions<A::Value>>,
    outputs: [FxHashSet<Cell>; 8],
    outbox: Outbox<Message<A::Value>>,
    accumulator: A,
}

impl<A: CellAccumulator> Traversal<A> {
    pub(crate) fn new(
        partition: usize,
        flow_direction: Arc<PartitionData<FlowDirection>>,
        inflow_count: PartitionData<u8>,
        outputs: [FxHashSet<Cell>; 8],
        outbox: Outbox<Message<A::Value>>,
        accumulator: A,
    ) -> Self {
        let mut traversal = Self {
            partition,
            flow_direction,
            inflow_count,
            waiting: FxHashMap::default(),
            outputs,
            outbox,
            accumulator,
        };
        // Neighbours that will never hear from us see the end of stream now.
        for direction in Direction::ALL {
            if traversal.outputs[direction.index()].is_empty() {
                traversal.outbox.close(direction);
            }
        }
        traversal
    }

    /// Marks all cells with a no-data flow direction and returns the ridge
    /// cells in row-major order.
    pub(crate) fn prepare(&mut self) -> Vec<Cell> {
        let mut ridges = Vec::new();
        for (cell, code) in self.flow_direction.iter() {
            if code.is_no_data() {
                self.accumulator.mark_no_data(cell);
            } else if self.inflow_count[cell] == 0 {
                ridges.push(cell);
            }
        }
        ridges
    }

    /// Routes the stream starting at the ready cell `start`.
    pub(crate) fn solve_from(
        &mut self,
        start: Cell,
        origin: StreamOrigin,
    ) -> Result<StreamExit, RouteError> {
        if self.flow_direction[start].is_no_data() {
            return Ok(StreamExit::NoData(start));
        }
        self.accumulator.enter_stream(start, origin);
        let exit = self.accumulate(start)?;
        self.accumulator.leave_stream(start, origin, exit);
        Ok(exit)
    }

    /// Applies a value received from the neighbour in `from` to `cell`, sent
    /// by a cell draining `along`, and routes the cell's stream once its
    /// last contribution is in.
    pub(crate) fn receive(
        &mut self,
        from: Direction,
        cell: Cell,
        along: Direction,
        value: A::Value,
    ) -> Result<Option<StreamExit>, RouteError> {
        let taken = self
            .waiting
            .get(&cell)
            .is_some_and(|slots| slots[along.index()].is_some());
        if self.inflow_count[cell] == 0 || taken {
            return Err(RouteError::UnexpectedInput {
                partition: self.partition,
                direction: from,
                cell,
            });
        }
        if !self.contribute(cell, along, Contribution::Received(value)) {
            return Ok(None);
        }
        self.solve_from(cell, StreamOrigin::PartitionInput).map(Some)
    }

    /// Records one contribution to `to` and returns `true` once `to` has
    /// all of them merged.
    fn contribute(
        &mut self,
        to: Cell,
        along: Direction,
        contribution: Contribution<A::Value>,
    ) -> bool {
        let count = &mut self.inflow_count[to];
        debug_assert!(*count > 0, "inflow count of {to} underflows");
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 && !self.waiting.contains_key(&to) {
            self.merge(to, contribution);
            return true;
        }
        let slots = self.waiting.entry(to).or_insert([None; 8]);
        slots[along.index()] = Some(contribution);
        if remaining > 0 {
            return false;
        }
        if let Some(slots) = self.waiting.remove(&to) {
            for contribution in slots.into_iter().flatten() {
                self.merge(to, contribution);
            }
        }
        true
    }

    fn merge(&mut self, to: Cell, contribution: Contribution<A::Value>) {
        match contribution {
            Contribution::Local(from) => self.accumulator.accumulate_downstream(from, to),
            Contribution::Received(value) => self.accumulator.accumulate_received(value, to),
        }
    }

    fn accumulate(&mut self, start: Cell) -> Result<StreamExit, RouteError> {
        let shape = self.flow_direction.shape();
        let mut cell = start;
        loop {
            let direction = match self.flow_direction[cell] {
                FlowDirection::NoData => return Ok(StreamExit::NoData(cell)),
                FlowDirection::Sink => {
                    self.accumulator.accumulate_external_inflow(cell);
                    return Ok(StreamExit::Sink(cell));
                }
                FlowDirection::Towards(direction) => direction,
            };
            self.accumulator.accumulate_external_inflow(cell);
            match step(shape, cell, direction) {
                Step::Outside { neighbour, index } => {
                    self.leave_partition(cell, direction, neighbour, index)?;
                    return Ok(StreamExit::PartitionOutput(cell));
                }
                Step::Inside(downstream) => {
                    if !self.contribute(downstream, direction, Contribution::Local(cell)) {
                        return Ok(StreamExit::Junction(downstream));
                    }
                    cell = downstream;
                }
            }
        }
    }

    fn leave_partition(
        &mut self,
        cell: Cell,
        along: Direction,
        neighbour: Direction,
        index: usize,
    ) -> Result<(), RouteError> {
        let pending = &mut self.outputs[neighbour.index()];
        pending.remove(&cell);
        let drained = pending.is_empty();
        self.outbox
            .send(neighbour, (index, along, self.accumulator.outflow(cell)))?;
        if drained {
            self.outbox.close(neighbour);
        }
        Ok(())
    }

    /// Checks that every cell was routed and every output sent, and returns
    /// the policy state.
    pub(crate) fn finish(self) -> Result<A, RouteError> {
        let mut unresolved = self
            .inflow_count
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(cell, _)| cell)
            .peekable();
        if let Some(&first) = unresolved.peek() {
            return Err(RouteError::Unresolved {
                partition: self.partition,
                unresolved: unresolved.count(),
                first,
            });
        }
        let unsent: Vec<Cell> = self.outputs.iter().flatten().copied().collect();
        if let Some(first) = unsent.iter().min().copied() {
            return Err(RouteError::Unresolved {
                partition: self.partition,
                unresolved: unsent.len(),
                first,
            });
        }
        Ok(self.accumulator)
    }
}
