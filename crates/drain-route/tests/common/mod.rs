// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use drain_grid::{Direction, FlowDirection, PartitionLayout, PartitionedArray, Shape};
use drain_route::{DomainViolation, Router, RouterConfig};

static TRACING: Once = Once::new();

/// Routes log output through the test harness; `RUST_LOG` is not consulted.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::WARN)
            .try_init();
    });
}

/// Router with the default configuration.
pub fn router() -> Router {
    init_tracing();
    Router::default()
}

/// Router that gives up on silent neighbours after `millis`.
pub fn impatient_router(millis: u64) -> Router {
    init_tracing();
    Router::new(RouterConfig::default().with_stall_timeout(Some(Duration::from_millis(millis))))
        .expect("valid config")
}

/// Router that fails on out-of-domain input.
pub fn strict_router() -> Router {
    init_tracing();
    Router::new(RouterConfig::default().with_domain_violation(DomainViolation::Reject))
        .expect("valid config")
}

/// Recuts `array` into partitions of `partition_shape`.
pub fn retile<T: Clone>(array: &PartitionedArray<T>, partition_shape: Shape) -> PartitionedArray<T> {
    PartitionedArray::from_dense(array.shape(), partition_shape, &array.to_dense())
        .expect("valid layout")
}

/// Global cell a cell drains into, if it lies inside the array.
pub fn downstream(shape: Shape, index: usize, code: FlowDirection) -> Option<usize> {
    let direction: Direction = code.direction()?;
    shape
        .offset(shape.cell_at(index), direction.offset())
        .map(|cell| shape.linear_index(cell))
}

/// Inflow counts computed directly from the global flow-direction buffer.
pub fn brute_force_counts(shape: Shape, flow: &[FlowDirection]) -> Vec<u8> {
    let mut counts = vec![0_u8; flow.len()];
    for (index, code) in flow.iter().enumerate() {
        if let Some(target) = downstream(shape, index, *code) {
            counts[target] += 1;
        }
    }
    for (count, code) in counts.iter_mut().zip(flow) {
        if *code == FlowDirection::NoData {
            *count = u8::MAX;
        }
    }
    counts
}

/// `true` when the cell at global `index` drains into another partition of
/// `layout` (not off the array).
pub fn drains_across(layout: &PartitionLayout, index: usize, code: FlowDirection) -> bool {
    let shape = layout.array_shape();
    let Some(target) = downstream(shape, index, code) else {
        return false;
    };
    let from = layout.locate(shape.cell_at(index)).map(|(p, _)| p);
    let to = layout.locate(shape.cell_at(target)).map(|(p, _)| p);
    from != to
}
