// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Inflow counting and boundary registration.
//!
//! Each partition counts, per cell, the streams that will still drain into
//! it: same-partition neighbours pointing at it plus cells of neighbouring
//! partitions pointing across the boundary. The cross-partition part is
//! learned by exchanging one registration message with every live
//! neighbour: the list of boundary indices (in the receiver's frame) that
//! the sender will deliver a value for. A cell whose count is zero is a
//! ridge and starts a stream.

use std::time::Duration;

use drain_grid::{Cell, Direction, FlowDirection, NoData, PartitionData};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::boundary::{entry_cell, step, Step};
use crate::channel::{receive, Communicator, Received};
use crate::RouteError;

/// Registration message: boundary indices in the receiver's frame, one per
/// stream crossing the boundary.
pub(crate) type Registration = Vec<usize>;

/// Routing topology of one partition.
#[derive(Debug)]
pub(crate) struct Connectivity {
    /// Contributions still owed to each cell.
    pub(crate) inflow_count: PartitionData<u8>,
    /// Per source direction: cells expecting input, with multiplicity.
    pub(crate) inputs: [FxHashMap<Cell, u8>; 8],
    /// Per destination direction: cells whose value must be sent.
    pub(crate) outputs: [FxHashSet<Cell>; 8],
}

impl Connectivity {
    /// Number of messages expected from `direction`.
    pub(crate) fn nr_inputs(&self, direction: Direction) -> usize {
        self.inputs[direction.index()]
            .values()
            .map(|n| usize::from(*n))
            .sum()
    }

    /// Number of cells whose value leaves the partition.
    pub(crate) fn nr_outputs(&self) -> usize {
        self.outputs.iter().map(FxHashSet::len).sum()
    }
}

/// Counts same-partition inflow and collects the partition's output cells.
///
/// Cells with a no-data flow direction drain nowhere. Cells draining off
/// the array edge are outputs too; they have no channel to send on.
fn local_topology(
    flow_direction: &PartitionData<FlowDirection>,
) -> (PartitionData<u8>, [FxHashSet<Cell>; 8], [Registration; 8]) {
    let shape = flow_direction.shape();
    let mut inflow_count = PartitionData::filled(shape, 0_u8);
    let mut outputs: [FxHashSet<Cell>; 8] = Default::default();
    let mut announcements: [Registration; 8] = Default::default();
    for (cell, code) in flow_direction.iter() {
        let Some(direction) = code.direction() else {
            continue;
        };
        match step(shape, cell, direction) {
            Step::Inside(target) => inflow_count[target] += 1,
            Step::Outside { neighbour, index } => {
                outputs[neighbour.index()].insert(cell);
                announcements[neighbour.index()].push(index);
            }
        }
    }
    (inflow_count, outputs, announcements)
}

/// Builds the partition's connectivity, exchanging registrations with its
/// neighbours over `communicator`.
pub(crate) async fn connectivity(
    partition: usize,
    flow_direction: &PartitionData<FlowDirection>,
    communicator: Communicator<Registration>,
    stall_timeout: Option<Duration>,
) -> Result<Connectivity, RouteError> {
    let shape = flow_direction.shape();
    let (mut inflow_count, outputs, mut announcements) = local_topology(flow_direction);
    let (mut outbox, mut inbox) = communicator.split();

    // Exactly one message per live neighbour, empty or not.
    for direction in Direction::ALL {
        if outbox.is_open(direction) {
            outbox.send(direction, std::mem::take(&mut announcements[direction.index()]))?;
            outbox.close(direction);
        }
    }

    let mut inputs: [FxHashMap<Cell, u8>; 8] = Default::default();
    for direction in Direction::ALL {
        let Some(mut receiver) = inbox.take(direction) else {
            continue;
        };
        let indices = match receive(&mut receiver, stall_timeout).await {
            Received::Message(indices) => indices,
            Received::Closed => {
                return Err(RouteError::ChannelClosed {
                    partition,
                    direction,
                    stage: "registration",
                    pending: 1,
                })
            }
            Received::TimedOut(waited) => {
                return Err(RouteError::Stalled {
                    partition,
                    direction,
                    stage: "registration",
                    pending: 1,
                    waited,
                })
            }
        };
        let expected = &mut inputs[direction.index()];
        for index in indices {
            let cell = entry_cell(shape, direction, index).ok_or_else(|| {
                RouteError::InvalidBoundaryIndex {
                    partition,
                    direction,
                    index,
                }
            })?;
            *expected.entry(cell).or_insert(0) += 1;
            inflow_count[cell] += 1;
        }
    }

    let connectivity = Connectivity {
        inflow_count,
        inputs,
        outputs,
    };
    debug!(
        partition,
        inputs = Direction::ALL
            .iter()
            .map(|d| connectivity.nr_inputs(*d))
            .sum::<usize>(),
        outputs = connectivity.nr_outputs(),
        "connectivity established"
    );
    Ok(connectivity)
}

/// Inflow counts as reported to callers: no-data where the flow direction
/// is no-data.
pub(crate) fn reported_counts(
    flow_direction: &PartitionData<FlowDirection>,
    inflow_count: &PartitionData<u8>,
) -> PartitionData<u8> {
    let mut counts = inflow_count.clone();
    for (cell, code) in flow_direction.iter() {
        if code.is_no_data() {
            counts[cell] = u8::NO_DATA;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use drain_grid::Shape;

    fn codes(shape: Shape, ldd: &[u8]) -> PartitionData<FlowDirection> {
        PartitionData::from_vec(shape, ldd.iter().map(|c| FlowDirection::from_ldd(*c)).collect())
            .unwrap()
    }

    #[test]
    fn converging_cells_count_each_upstream() {
        // All eight neighbours drain into the centre sink.
        let flow = codes(Shape::new(3, 3), &[3, 2, 1, 6, 5, 4, 9, 8, 7]);
        let (counts, outputs, _) = local_topology(&flow);
        assert_eq!(counts[Cell::new(1, 1)], 8);
        assert_eq!(counts.as_slice().iter().map(|c| u32::from(*c)).sum::<u32>(), 8);
        assert!(outputs.iter().all(FxHashSet::is_empty));
    }

    #[test]
    fn diverging_cells_are_all_outputs() {
        // The centre drains east; everything else drains outwards.
        let flow = codes(Shape::new(3, 3), &[7, 8, 9, 4, 6, 6, 1, 2, 3]);
        let (counts, outputs, announcements) = local_topology(&flow);
        assert_eq!(counts[Cell::new(1, 2)], 1);
        assert_eq!(outputs.iter().map(FxHashSet::len).sum::<usize>(), 8);
        assert_eq!(announcements[Direction::North.index()], vec![1]);
        assert_eq!(announcements[Direction::East.index()], vec![1]);
        assert_eq!(announcements[Direction::NorthWest.index()], vec![0]);
    }

    #[test]
    fn no_data_cells_drain_nowhere() {
        let flow = codes(Shape::new(1, 3), &[6, 0, 4]);
        let (counts, _, _) = local_topology(&flow);
        assert_eq!(counts.as_slice(), &[0, 2, 0]);
        let reported = reported_counts(&flow, &counts);
        assert_eq!(reported.as_slice(), &[0, u8::MAX, 0]);
    }
}
