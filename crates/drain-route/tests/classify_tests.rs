// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use drain_dry_tests::{merging_streams, parallel, spiral_in};
use drain_grid::{Cell, Direction, FlowDirection};
use drain_route::CellClass;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_east_tags_stream_segments() {
    use CellClass::{
        InterPartitionStream as Inter, IntraPartitionStream as Intra, PartitionInput as In,
        PartitionOutput as Out, Ridge,
    };
    let classes = common::router()
        .classify_cells(&parallel(Direction::East))
        .await
        .unwrap();
    let row: Vec<CellClass> = classes.to_dense()[..9].to_vec();
    assert_eq!(row, vec![Ridge, Intra, Out, In, Inter, Out, In, Inter, Out]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spiral_in_classes_match_the_topology() {
    let router = common::router();
    let flow_direction = spiral_in();
    let layout = *flow_direction.layout();
    let classes = router.classify_cells(&flow_direction).await.unwrap().to_dense();
    let counts = router.inflow_count(&flow_direction).await.unwrap().to_dense();
    let flow = flow_direction.to_dense();

    for (index, class) in classes.iter().enumerate() {
        assert_eq!(
            *class == CellClass::Ridge,
            counts[index] == 0,
            "ridge status of cell {index}"
        );
        if common::drains_across(&layout, index, flow[index]) {
            assert!(
                matches!(
                    class,
                    CellClass::PartitionOutput | CellClass::PartitionInputOutput
                ),
                "cell {index} drains into a neighbour but is {class:?}"
            );
        }
    }
    let shape = layout.array_shape();
    assert_eq!(classes[shape.linear_index(Cell::new(4, 4))], CellClass::Sink);
    assert_eq!(classes[0], CellClass::Ridge);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_cell_partitions_pass_streams_through() {
    let flow_direction = common::retile(&parallel(Direction::South), drain_grid::Shape::new(1, 9));
    let classes = common::router()
        .classify_cells(&flow_direction)
        .await
        .unwrap()
        .to_dense();
    assert!(classes[..9].iter().all(|c| *c == CellClass::PartitionOutput));
    assert!(classes[9..]
        .iter()
        .all(|c| *c == CellClass::PartitionInputOutput));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_data_flow_direction_is_tagged_no_data() {
    let flow_direction = merging_streams();
    let classes = common::router()
        .classify_cells(&flow_direction)
        .await
        .unwrap()
        .to_dense();
    for (class, code) in classes.iter().zip(flow_direction.to_dense()) {
        assert_eq!(*class == CellClass::NoData, code == FlowDirection::NoData);
    }
    assert_eq!(CellClass::NoData.code(), u8::MAX);
}
