// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plain accumulation: every cell passes on everything it receives.

use drain_grid::{Cell, NoData, PartitionData, Shape};

use crate::accumulator::{Accumulation, CellAccumulator, DomainReport};
use crate::material::{Argument, CellValues, Material};
use crate::policy::is_amount;

/// Plain accumulation of an external inflow.
#[derive(Debug, Clone)]
pub struct Accumulate<M> {
    inflow: Argument<M>,
}

impl<M: Material> Accumulate<M> {
    /// Accumulates `inflow` along the drainage network.
    pub fn new(inflow: impl Into<Argument<M>>) -> Self {
        Self {
            inflow: inflow.into(),
        }
    }

    pub(crate) fn arguments(&self) -> [(&'static str, &Argument<M>); 1] {
        [("inflow", &self.inflow)]
    }
}

impl<M: Material> Accumulation for Accumulate<M> {
    type Accumulator = AccumulateCells<M>;

    fn name(&self) -> &'static str {
        "accumulate"
    }

    fn accumulator(&self, partition: usize, shape: Shape) -> AccumulateCells<M> {
        AccumulateCells {
            inflow: self.inflow.cells(partition),
            outflow: PartitionData::filled(shape, M::ZERO),
            domain: DomainReport::default(),
        }
    }
}

/// Per-partition state of [`Accumulate`].
#[derive(Debug)]
pub struct AccumulateCells<M> {
    inflow: CellValues<M>,
    outflow: PartitionData<M>,
    domain: DomainReport,
}

impl<M: Material> AccumulateCells<M> {
    fn merge(&mut self, upstream: M, to: Cell) {
        let outflow = &mut self.outflow[to];
        if outflow.is_no_data() {
            return;
        }
        *outflow = if upstream.is_no_data() {
            M::NO_DATA
        } else {
            *outflow + upstream
        };
    }
}

impl<M: Material> CellAccumulator for AccumulateCells<M> {
    type Value = M;
    type Output = PartitionData<M>;

    fn accumulate_external_inflow(&mut self, cell: Cell) {
        if self.outflow[cell].is_no_data() {
            return;
        }
        let inflow = self.inflow.at(cell);
        if !inflow.is_no_data() && !is_amount(inflow) {
            self.domain.record(cell);
            self.mark_no_data(cell);
            return;
        }
        self.merge(inflow, cell);
    }

    fn accumulate_downstream(&mut self, from: Cell, to: Cell) {
        let upstream = self.outflow[from];
        self.merge(upstream, to);
    }

    fn accumulate_received(&mut self, value: M, to: Cell) {
        self.merge(value, to);
    }

    fn outflow(&self, cell: Cell) -> M {
        self.outflow[cell]
    }

    fn mark_no_data(&mut self, cell: Cell) {
        self.outflow[cell] = M::NO_DATA;
    }

    fn domain_report(&self) -> DomainReport {
        self.domain
    }

    fn into_output(self) -> PartitionData<M> {
        self.outflow
    }
}
