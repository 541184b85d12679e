// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cell-role classification: which part of the routing handled each cell.

use drain_grid::{Cell, NoData, PartitionData, Shape};

use crate::accumulator::{Accumulation, CellAccumulator, StreamExit, StreamOrigin};

/// Role of a cell in the routing of its partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellClass {
    /// Inside a stream that started at a ridge of the same partition.
    IntraPartitionStream = 11,
    /// Start of a stream: no upstream contributions.
    Ridge = 12,
    /// Start of a stream resumed by a value from a neighbouring partition.
    PartitionInput = 13,
    /// Drains into a neighbouring partition (or off the array).
    PartitionOutput = 14,
    /// Receives from and drains into neighbouring partitions.
    PartitionInputOutput = 15,
    /// End of a stream.
    Sink = 16,
    /// Inside a stream resumed by a value from a neighbouring partition.
    InterPartitionStream = 21,
    /// Flow direction is no-data.
    NoData = 255,
}

impl CellClass {
    /// Numeric code of the class.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl NoData for CellClass {
    const NO_DATA: Self = Self::NoData;

    fn is_no_data(self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Classification of every cell by its role in the routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyCells;

impl Accumulation for ClassifyCells {
    type Accumulator = ClassifyState;

    fn name(&self) -> &'static str {
        "classify_cells"
    }

    fn accumulator(&self, _partition: usize, shape: Shape) -> ClassifyState {
        ClassifyState {
            classes: PartitionData::filled(shape, CellClass::IntraPartitionStream),
            stream: CellClass::IntraPartitionStream,
        }
    }
}

/// Per-partition state of [`ClassifyCells`].
#[derive(Debug)]
pub struct ClassifyState {
    classes: PartitionData<CellClass>,
    /// Tag of the cells of the stream being routed.
    stream: CellClass,
}

impl CellAccumulator for ClassifyState {
    type Value = CellClass;
    type Output = PartitionData<CellClass>;

    fn accumulate_external_inflow(&mut self, cell: Cell) {
        if !self.classes[cell].is_no_data() {
            self.classes[cell] = self.stream;
        }
    }

    // A junction takes the tag of the stream that continues through it.
    fn accumulate_downstream(&mut self, _from: Cell, _to: Cell) {}

    fn accumulate_received(&mut self, _value: CellClass, _to: Cell) {}

    fn outflow(&self, cell: Cell) -> CellClass {
        self.classes[cell]
    }

    fn mark_no_data(&mut self, cell: Cell) {
        self.classes[cell] = CellClass::NoData;
    }

    fn enter_stream(&mut self, _cell: Cell, origin: StreamOrigin) {
        self.stream = match origin {
            StreamOrigin::Ridge => CellClass::IntraPartitionStream,
            StreamOrigin::PartitionInput => CellClass::InterPartitionStream,
        };
    }

    fn leave_stream(&mut self, start: Cell, origin: StreamOrigin, exit: StreamExit) {
        self.classes[start] = match origin {
            StreamOrigin::Ridge => CellClass::Ridge,
            StreamOrigin::PartitionInput => CellClass::PartitionInput,
        };
        match exit {
            StreamExit::Sink(cell) => self.classes[cell] = CellClass::Sink,
            StreamExit::PartitionOutput(cell) => {
                self.classes[cell] = if cell == start && origin == StreamOrigin::PartitionInput {
                    CellClass::PartitionInputOutput
                } else {
                    CellClass::PartitionOutput
                };
            }
            StreamExit::Junction(_) | StreamExit::NoData(_) => {}
        }
    }

    fn into_output(self) -> PartitionData<CellClass> {
        self.classes
    }
}
