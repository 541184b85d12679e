// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cell-accumulation policies.
//!
//! | Policy | External inflow | Passed downstream |
//! |---|---|---|
//! | [`Accumulate`] | `outflow += inflow` | outflow |
//! | [`AccumulateThreshold`] | retain up to the threshold | outflow |
//! | [`AccumulateFraction`] | pass on a fraction | outflow |
//! | [`ClassifyCells`] | none | the cell's class |
//! | [`PartialAccumulate`] | none | steps from the furthest ridge |
//!
//! Kinematic-wave routing fits the same contract (it adds channel length,
//! wave exponents and a time step per cell) and is not provided here.

mod accumulate;
mod classify;
mod fraction;
mod partial;
mod threshold;

pub use accumulate::{Accumulate, AccumulateCells};
pub use classify::{CellClass, ClassifyCells, ClassifyState};
pub use fraction::{AccumulateFraction, FractionCells};
pub use partial::{PartialAccumulate, StepCells};
pub use threshold::{AccumulateThreshold, ThresholdCells};

use drain_grid::{Cell, NoData, PartitionData};

use crate::material::Material;

/// Outflow and remainder of a split policy, updated as a pair.
#[derive(Debug, Clone)]
pub(crate) struct SplitState<M> {
    pub(crate) outflow: PartitionData<M>,
    pub(crate) remainder: PartitionData<M>,
}

impl<M: Material> SplitState<M> {
    pub(crate) fn new(shape: drain_grid::Shape) -> Self {
        Self {
            outflow: PartitionData::filled(shape, M::ZERO),
            remainder: PartitionData::filled(shape, M::ZERO),
        }
    }

    pub(crate) fn is_no_data(&self, cell: Cell) -> bool {
        self.outflow[cell].is_no_data()
    }

    pub(crate) fn mark_no_data(&mut self, cell: Cell) {
        self.outflow[cell] = M::NO_DATA;
        self.remainder[cell] = M::NO_DATA;
    }

    /// Adds an upstream outflow to `to`; no-data upstream makes `to`
    /// no-data.
    pub(crate) fn merge(&mut self, upstream: M, to: Cell) {
        if self.is_no_data(to) {
            return;
        }
        if upstream.is_no_data() {
            self.mark_no_data(to);
        } else {
            self.outflow[to] = self.outflow[to] + upstream;
        }
    }
}

/// `true` for material amounts a policy accepts: zero or more.
pub(crate) fn is_amount<M: Material>(value: M) -> bool {
    value >= M::ZERO
}
