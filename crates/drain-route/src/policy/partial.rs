// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Step-limited accumulation: how far downstream of a ridge each cell lies.

use drain_grid::{Cell, NoData, PartitionData, Shape};

use crate::accumulator::{Accumulation, CellAccumulator};

/// Counts the steps from the furthest ridge upstream of every cell and gives
/// up after `nr_steps`.
///
/// Ridges are at step 0. Every other cell is one step past the furthest of
/// its upstream cells, within the partition or across its boundary. Where
/// streams join the longest one wins. Cells beyond `nr_steps` are no-data,
/// and so is everything downstream of them.
#[derive(Debug, Clone, Copy)]
pub struct PartialAccumulate {
    nr_steps: u32,
}

impl PartialAccumulate {
    /// Counts up to `nr_steps` steps along every stream.
    pub const fn new(nr_steps: u32) -> Self {
        Self { nr_steps }
    }
}

impl Accumulation for PartialAccumulate {
    type Accumulator = StepCells;

    fn name(&self) -> &'static str {
        "partial_accumulate"
    }

    fn accumulator(&self, _partition: usize, shape: Shape) -> StepCells {
        StepCells {
            nr_steps: self.nr_steps,
            steps: PartitionData::filled(shape, 0),
        }
    }
}

/// Per-partition state of [`PartialAccumulate`].
#[derive(Debug)]
pub struct StepCells {
    nr_steps: u32,
    steps: PartitionData<u32>,
}

impl StepCells {
    fn merge(&mut self, upstream: u32, to: Cell) {
        let steps = &mut self.steps[to];
        if steps.is_no_data() {
            return;
        }
        *steps = if upstream.is_no_data() {
            u32::NO_DATA
        } else {
            (*steps).max(upstream.saturating_add(1))
        };
    }
}

impl CellAccumulator for StepCells {
    type Value = u32;
    type Output = PartitionData<u32>;

    fn accumulate_external_inflow(&mut self, cell: Cell) {
        if self.steps[cell] > self.nr_steps {
            self.mark_no_data(cell);
        }
    }

    fn accumulate_downstream(&mut self, from: Cell, to: Cell) {
        let upstream = self.steps[from];
        self.merge(upstream, to);
    }

    fn accumulate_received(&mut self, value: u32, to: Cell) {
        self.merge(value, to);
    }

    fn outflow(&self, cell: Cell) -> u32 {
        self.steps[cell]
    }

    fn mark_no_data(&mut self, cell: Cell) {
        self.steps[cell] = u32::NO_DATA;
    }

    fn into_output(self) -> PartitionData<u32> {
        self.steps
    }
}
