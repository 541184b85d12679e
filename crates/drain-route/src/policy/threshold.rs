// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Threshold split: each cell retains material up to a threshold.

use drain_grid::{Cell, NoData, PartitionData, Shape};

use crate::accumulator::{Accumulation, CellAccumulator, DomainReport};
use crate::material::{Argument, CellValues, Material};
use crate::policy::{is_amount, SplitState};

/// Accumulation where every cell keeps up to `threshold` of what reaches it
/// and passes the excess on.
///
/// With `total` the upstream outflow plus the cell's own inflow: if
/// `total > threshold` the cell retains `threshold` and passes
/// `total - threshold`; otherwise it retains everything and passes nothing.
#[derive(Debug, Clone)]
pub struct AccumulateThreshold<M> {
    inflow: Argument<M>,
    threshold: Argument<M>,
}

impl<M: Material> AccumulateThreshold<M> {
    /// Routes `inflow`, retaining up to `threshold` per cell.
    pub fn new(inflow: impl Into<Argument<M>>, threshold: impl Into<Argument<M>>) -> Self {
        Self {
            inflow: inflow.into(),
            threshold: threshold.into(),
        }
    }

    pub(crate) fn arguments(&self) -> [(&'static str, &Argument<M>); 2] {
        [("inflow", &self.inflow), ("threshold", &self.threshold)]
    }
}

impl<M: Material> Accumulation for AccumulateThreshold<M> {
    type Accumulator = ThresholdCells<M>;

    fn name(&self) -> &'static str {
        "accumulate_threshold"
    }

    fn accumulator(&self, partition: usize, shape: Shape) -> ThresholdCells<M> {
        ThresholdCells {
            inflow: self.inflow.cells(partition),
            threshold: self.threshold.cells(partition),
            state: SplitState::new(shape),
            domain: DomainReport::default(),
        }
    }
}

/// Per-partition state of [`AccumulateThreshold`].
#[derive(Debug)]
pub struct ThresholdCells<M> {
    inflow: CellValues<M>,
    threshold: CellValues<M>,
    state: SplitState<M>,
    domain: DomainReport,
}

impl<M: Material> CellAccumulator for ThresholdCells<M> {
    type Value = M;
    type Output = (PartitionData<M>, PartitionData<M>);

    fn accumulate_external_inflow(&mut self, cell: Cell) {
        if self.state.is_no_data(cell) {
            return;
        }
        let inflow = self.inflow.at(cell);
        let threshold = self.threshold.at(cell);
        if inflow.is_no_data() || threshold.is_no_data() {
            self.state.mark_no_data(cell);
            return;
        }
        if !is_amount(inflow) || !is_amount(threshold) {
            self.domain.record(cell);
            self.state.mark_no_data(cell);
            return;
        }
        let total = self.state.outflow[cell] + inflow;
        let (outflow, remainder) = if total > threshold {
            (total - threshold, threshold)
        } else {
            (M::ZERO, total)
        };
        self.state.outflow[cell] = outflow;
        self.state.remainder[cell] = remainder;
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
    fn retains_up_to_threshold() {
        let mut state =
            AccumulateThreshold::new(1.0_f64, 1.5_f64).accumulator(0, Shape::new(1, 2));
        let (a, b) = (Cell::new(0, 0), Cell::new(0, 1));
        state.accumulate_external_inflow(a);
        assert_eq!(state.outflow(a), 0.0);
        state.accumulate_received(3.0, b);
        state.accumulate_external_inflow(b);
        assert_eq!(state.outflow(b), 2.5);
        let (outflow, remainder) = state.into_output();
        assert_eq!(remainder.as_slice(), &[1.0, 1.5]);
        assert_eq!(outflow.as_slice(), &[0.0, 2.5]);
    }

    #[test]
    fn no_data_threshold_voids_both_outputs() {
        let mut state =
            AccumulateThreshold::new(1.0_f64, f64::NAN).accumulator(0, Shape::new(1, 1));
        state.accumulate_external_inflow(Cell::new(0, 0));
        let (outflow, remainder) = state.into_output();
        assert!(outflow.as_slice()[0].is_nan());
        assert!(remainder.as_slice()[0].is_nan());
    }

    #[test]
    fn negative_threshold_is_out_of_domain() {
        let mut state =
            AccumulateThreshold::new(1.0_f64, -0.5_f64).accumulator(0, Shape::new(1, 1));
        state.accumulate_external_inflow(Cell::new(0, 0));
        assert_eq!(state.domain_report().count, 1);
        assert!(state.outflow(Cell::new(0, 0)).is_nan());
    }
}
