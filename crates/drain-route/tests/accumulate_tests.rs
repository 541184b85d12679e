// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use drain_dry_tests::{
    assert_cells_eq, flow, merging_streams, parallel, parallel_outflow, partitioned, spiral_in,
    spiral_in_outflow, ARRAY_SHAPE, PARTITION_SHAPE,
};
use drain_grid::{Cell, Direction, FlowDirection, PartitionedArray, Shape};
use drain_route::{RouteError, Scalar};

const X: f64 = f64::NAN;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_flow_in_every_direction() {
    let router = common::router();
    for direction in Direction::ALL {
        let outflow: PartitionedArray<f64> = router
            .accumulate(&parallel(direction), 1.0)
            .await
            .unwrap();
        assert_eq!(
            outflow.to_dense(),
            parallel_outflow(direction),
            "flowing {direction}"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_east_reads_per_partition() {
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&parallel(Direction::East), 1.0)
        .await
        .unwrap();
    let partitions = outflow.to_partition_values();
    assert_eq!(partitions[0], vec![1., 2., 3., 1., 2., 3., 1., 2., 3.]);
    assert_eq!(partitions[1], vec![4., 5., 6., 4., 5., 6., 4., 5., 6.]);
    assert_eq!(partitions[8], vec![7., 8., 9., 7., 8., 9., 7., 8., 9.]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spiral_in_crosses_every_partition() {
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&spiral_in(), 1.0)
        .await
        .unwrap();
    assert_eq!(outflow.to_partition_values(), spiral_in_outflow());
}

#[tokio::test]
async fn single_threaded_runtime_gives_the_same_result() {
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&spiral_in(), 1.0)
        .await
        .unwrap();
    assert_eq!(outflow.to_partition_values(), spiral_in_outflow());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stream_running_back_and_forth_between_partitions() {
    let flow_direction = partitioned(
        Shape::new(6, 5),
        Shape::new(3, 5),
        vec![
            flow("s e s e s  s n s n s  s n s n s"),
            flow("s n s n s  s n s n s  e n e n p"),
        ],
    );
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&flow_direction, 1.0)
        .await
        .unwrap();
    assert_eq!(
        outflow.to_partition_values(),
        vec![
            vec![1., 12., 13., 24., 25., 2., 11., 14., 23., 26., 3., 10., 15., 22., 27.],
            vec![4., 9., 16., 21., 28., 5., 8., 17., 20., 29., 6., 7., 18., 19., 30.],
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_data_inflow_propagates_downstream_across_partitions() {
    let mut inflow = vec![vec![1.0; 9]; 9];
    inflow[2][1] = X;
    let inflow = partitioned(ARRAY_SHAPE, PARTITION_SHAPE, inflow);
    let outflow = common::router()
        .accumulate(&merging_streams(), &inflow)
        .await
        .unwrap();
    let want = partitioned(
        ARRAY_SHAPE,
        PARTITION_SHAPE,
        vec![
            vec![X, X, X, X, X, X, X, X, 1.],
            vec![X, 1., 1., X, 1., 1., X, 2., X],
            vec![X, X, 1., 3., X, 1., X, X, 1.],
            vec![X, X, 1., X, X, 1., X, X, 1.],
            vec![4., X, X, X, X, 2., 2., X, 3.],
            vec![X, X, X, 1., X, X, 1., X, X],
            vec![X, X, X, X, X, X, X, X, X],
            vec![X, X, X, X, X, 2., 4., 3., 2.],
            vec![1., X, X, 1., X, X, 1., X, X],
        ],
    );
    assert_cells_eq(&outflow.to_dense(), &want.to_dense());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_no_data_flow_direction_gives_all_no_data() {
    let flow_direction =
        PartitionedArray::filled(ARRAY_SHAPE, PARTITION_SHAPE, FlowDirection::NoData).unwrap();
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&flow_direction, 1.0)
        .await
        .unwrap();
    assert!(outflow.to_dense().iter().all(|v| v.is_nan()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_no_data_inflow_gives_all_no_data() {
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&parallel(Direction::East), X)
        .await
        .unwrap();
    assert!(outflow.to_dense().iter().all(|v| v.is_nan()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn isolated_sink_keeps_its_own_inflow() {
    let mut cells = vec![FlowDirection::Towards(Direction::East); 36];
    let shape = Shape::new(6, 6);
    cells[shape.linear_index(Cell::new(4, 4))] = FlowDirection::Sink;
    cells[shape.linear_index(Cell::new(4, 3))] =
        FlowDirection::Towards(Direction::North);
    let flow_direction = PartitionedArray::from_dense(shape, Shape::new(3, 3), &cells).unwrap();
    let outflow: PartitionedArray<f64> = common::router()
        .accumulate(&flow_direction, 2.5)
        .await
        .unwrap();
    assert_eq!(outflow.get(Cell::new(4, 4)), Some(&2.5));
    assert_eq!(outflow.get(Cell::new(4, 5)), Some(&2.5));
    assert_eq!(outflow.get(Cell::new(3, 3)), Some(&20.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scalar_value_and_array_inflow_agree() {
    let router = common::router();
    let flow_direction = spiral_in();
    let ones = PartitionedArray::filled(ARRAY_SHAPE, PARTITION_SHAPE, 1.0_f32).unwrap();
    let from_array = router.accumulate(&flow_direction, ones).await.unwrap();
    let from_scalar = router
        .accumulate(&flow_direction, Scalar::new(1.0_f32))
        .await
        .unwrap();
    let from_value: PartitionedArray<f32> =
        router.accumulate(&flow_direction, 1.0_f32).await.unwrap();
    assert_eq!(from_array.to_dense(), from_scalar.to_dense());
    assert_eq!(from_array.to_dense(), from_value.to_dense());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn repeated_runs_are_bit_identical() {
    let router = common::router();
    let flow_direction = merging_streams();
    let inflow = partitioned(
        ARRAY_SHAPE,
        PARTITION_SHAPE,
        (0..9)
            .map(|p| (0..9).map(|i| f64::from(p * 9 + i) * 0.1).collect())
            .collect(),
    );
    let first: Vec<u64> = router
        .accumulate(&flow_direction, &inflow)
        .await
        .unwrap()
        .to_dense()
        .iter()
        .map(|v| v.to_bits())
        .collect();
    for _ in 0..16 {
        let again: Vec<u64> = router
            .accumulate(&flow_direction, &inflow)
            .await
            .unwrap()
            .to_dense()
            .iter()
            .map(|v| v.to_bits())
            .collect();
        assert_eq!(again, first);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn junction_sum_ignores_arrival_order() {
    // Three single-cell partitions drain into the sink; 1 + 2⁻⁵³ + 2⁻⁵³
    // rounds differently depending on which addition comes first.
    let router = common::router();
    let flow_direction = partitioned(
        Shape::new(2, 2),
        Shape::new(1, 1),
        vec![flow("se"), flow("s"), flow("e"), flow("p")],
    );
    let tiny = f64::EPSILON / 2.0;
    let inflow = partitioned(
        Shape::new(2, 2),
        Shape::new(1, 1),
        vec![vec![tiny], vec![1.0], vec![tiny], vec![0.0]],
    );
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..500 {
        let outflow: PartitionedArray<f64> =
            router.accumulate(&flow_direction, &inflow).await.unwrap();
        seen.insert(outflow.to_dense()[3].to_bits());
    }
    // East, then south-east, then south.
    let want = (tiny + tiny) + 1.0;
    assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![want.to_bits()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn partition_shape_does_not_change_the_result() {
    let router = common::router();
    let want: PartitionedArray<f64> = router.accumulate(&spiral_in(), 1.0).await.unwrap();
    for partition_shape in [Shape::new(9, 9), Shape::new(4, 4), Shape::new(2, 5), Shape::new(1, 1)] {
        let flow_direction = common::retile(&spiral_in(), partition_shape);
        let got: PartitionedArray<f64> = router.accumulate(&flow_direction, 1.0).await.unwrap();
        assert_eq!(got.to_dense(), want.to_dense(), "partitions of {partition_shape}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mistiled_inflow_is_rejected() {
    let inflow = PartitionedArray::filled(ARRAY_SHAPE, Shape::new(9, 3), 1.0_f64).unwrap();
    let err = common::router()
        .accumulate(&spiral_in(), inflow)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RouteError::LayoutMismatch {
            argument: "inflow",
            ..
        }
    ));
}
