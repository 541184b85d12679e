// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fraction split: each cell passes on a fixed share of what reaches it.

use drain_grid::{Cell, NoData, PartitionData, Shape};

use crate::accumulator::{Accumulation, CellAccumulator, DomainReport};
use crate::material::{Argument, CellValues, Material};
use crate::policy::{is_amount, SplitState};

/// Accumulation where every cell passes on `fraction` of the upstream
/// outflow plus its own inflow, and retains the rest.
#[derive(Debug, Clone)]
pub struct AccumulateFraction<M> {
    inflow: Argument<M>,
    fraction: Argument<M>,
}

impl<M: Material> AccumulateFraction<M> {
    /// Routes `inflow`, passing on `fraction` (in `[0, 1]`) per cell.
    pub fn new(inflow: impl Into<Argument<M>>, fraction: impl Into<Argument<M>>) -> Self {
        Self {
            inflow: inflow.into(),
            fraction: fraction.into(),
        }
    }

    pub(crate) fn arguments(&self) -> [(&'static str, &Argument<M>); 2] {
        [("inflow", &self.inflow), ("fraction", &self.fraction)]
    }
}

impl<M: Material> Accumulation for AccumulateFraction<M> {
    type Accumulator = FractionCells<M>;

    fn name(&self) -> &'static str {
        "accumulate_fraction"
    }

    fn accumulator(&self, partition: usize, shape: Shape) -> FractionCells<M> {
        FractionCells {
            inflow: self.inflow.cells(partition),
            fraction: self.fraction.cells(partition),
            state: SplitState::new(shape),
            domain: DomainReport::default(),
        }
    }
}

/// Per-partition state of [`AccumulateFraction`].
#[derive(Debug)]
pub struct FractionCells<M> {
    inflow: CellValues<M>,
    fraction: CellValues<M>,
    state: SplitState<M>,
    domain: DomainReport,
}

impl<M: Material> CellAccumulator for FractionCells<M> {
    type Value = M;
    type Output = (PartitionData<M>, PartitionData<M>);

    fn accumulate_external_inflow(&mut self, cell: Cell) {
        if self.state.is_no_data(cell) {
            return;
        }
        let inflow = self.inflow.at(cell);
        let fraction = self.fraction.at(cell);
        if inflow.is_no_data() || fraction.is_no_data() {
            self.state.mark_no_data(cell);
            return;
        }
        if !is_amount(inflow) || !is_amount(fraction) || fraction > M::ONE {
            self.domain.record(cell);
            self.state.mark_no_data(cell);
            return;
        }
        let total = self.state.outflow[cell] + inflow;
        let outflow = fraction * total;
        self.state.outflow[cell] = outflow;
        self.state.remainder[cell] = total - outflow;
    }

    fn accumulate_downstream(&mut self, from: Cell, to: Cell) {
        let upstream = self.state.outflow[from];
        self.state.merge(upstream, to);
    }

    fn accumulate_received(&mut self, value: M, to: Cell) {
        self.state.merge(value, to);
    }

    fn outflow(&self, cell: Cell) -> M {
        self.state.outflow[cell]
    }

    fn mark_no_data(&mut self, cell: Cell) {
        self.state.mark_no_data(cell);
    }

    fn domain_report(&self) -> DomainReport {
        self.domain
    }

    fn into_output(self) -> (PartitionData<M>, PartitionData<M>) {
        (self.state.outflow, self.state.remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_total_by_fraction() {
        let mut state = AccumulateFraction::new(1.0_f64, 0.25_f64).accumulator(0, Shape::new(1, 1));
        let cell = Cell::new(0, 0);
        state.accumulate_received(3.0, cell);
        state.accumulate_external_inflow(cell);
        let (outflow, remainder) = state.into_output();
        assert_eq!(outflow.as_slice(), &[1.0]);
        assert_eq!(remainder.as_slice(), &[3.0]);
    }

    #[test]
    fn fraction_above_one_is_out_of_domain() {
        let mut state = AccumulateFraction::new(1.0_f64, 1.5_f64).accumulator(0, Shape::new(1, 1));
        state.accumulate_external_inflow(Cell::new(0, 0));
        assert_eq!(state.domain_report().count, 1);
        let (outflow, remainder) = state.into_output();
        assert!(outflow.as_slice()[0].is_nan());
        assert!(remainder.as_slice()[0].is_nan());
    }
}
