// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use drain_dry_tests::{merging_streams, parallel, pcraster_network, spiral_in};
use drain_grid::{Cell, Direction, Shape};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counts_match_the_global_network() {
    let router = common::router();
    for flow_direction in [spiral_in(), merging_streams(), parallel(Direction::NorthWest)] {
        let counts = router.inflow_count(&flow_direction).await.unwrap();
        assert_eq!(
            counts.to_dense(),
            common::brute_force_counts(flow_direction.shape(), &flow_direction.to_dense())
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spiral_in_has_a_single_ridge() {
    let counts = common::router()
        .inflow_count(&spiral_in())
        .await
        .unwrap()
        .to_dense();
    let ridges: Vec<usize> = (0..counts.len()).filter(|i| counts[*i] == 0).collect();
    assert_eq!(ridges, vec![0]);
    assert_eq!(counts.iter().map(|c| u32::from(*c)).sum::<u32>(), 80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pcraster_sink_collects_four_streams() {
    let flow_direction = common::retile(&pcraster_network(), Shape::new(2, 2));
    let counts = common::router()
        .inflow_count(&flow_direction)
        .await
        .unwrap();
    // Five neighbours drain into the pit.
    assert_eq!(counts.get(Cell::new(4, 1)), Some(&5));
    assert_eq!(counts.get(Cell::new(0, 0)), Some(&0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_data_cells_report_the_marker() {
    let counts = common::router()
        .inflow_count(&merging_streams())
        .await
        .unwrap();
    assert_eq!(counts.get(Cell::new(0, 0)), Some(&u8::MAX));
    assert_eq!(counts.get(Cell::new(2, 2)), Some(&0));
}
