// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical drainage networks and their reference results.
//!
//! Unless stated otherwise fixtures are 9×9 arrays cut into 3×3 partitions
//! of 3×3 cells; value lists are given per partition, row-major.

use drain_grid::{Cell, Direction, FlowDirection, PartitionedArray, Shape};

use crate::arrays::{flow, partitioned};

/// Shape of the multi-partition fixtures.
pub const ARRAY_SHAPE: Shape = Shape::new(9, 9);
/// Partition shape of the multi-partition fixtures.
pub const PARTITION_SHAPE: Shape = Shape::new(3, 3);

fn fixture(partitions: [&str; 9]) -> PartitionedArray<FlowDirection> {
    partitioned(
        ARRAY_SHAPE,
        PARTITION_SHAPE,
        partitions.into_iter().map(flow).collect(),
    )
}

/// One stream spiralling clockwise from the top-left corner into a sink in
/// the centre. Every partition is crossed several times.
pub fn spiral_in() -> PartitionedArray<FlowDirection> {
    fixture([
        "e e e  e e e  n e e",
        "e e e  e e e  e e e",
        "e e s  e s s  s s s",
        "n n e  n n n  n n n",
        "e e s  e p s  n w w",
        "s s s  s s s  s s s",
        "n n n  n n w  n w w",
        "w w w  w w w  w w w",
        "w s s  w w s  w w w",
    ])
}

/// Accumulated unit inflow over [`spiral_in`], per partition.
pub fn spiral_in_outflow() -> Vec<Vec<f64>> {
    vec![
        vec![1., 2., 3., 32., 33., 34., 31., 56., 57.],
        vec![4., 5., 6., 35., 36., 37., 58., 59., 60.],
        vec![7., 8., 9., 38., 39., 10., 61., 40., 11.],
        vec![30., 55., 72., 29., 54., 71., 28., 53., 70.],
        vec![73., 74., 75., 80., 81., 76., 79., 78., 77.],
        vec![62., 41., 12., 63., 42., 13., 64., 43., 14.],
        vec![27., 52., 69., 26., 51., 50., 25., 24., 23.],
        vec![68., 67., 66., 49., 48., 47., 22., 21., 20.],
        vec![65., 44., 15., 46., 45., 16., 19., 18., 17.],
    ]
}

/// Short streams that merge across partition boundaries, surrounded by
/// no-data.
pub fn merging_streams() -> PartitionedArray<FlowDirection> {
    fixture([
        "x x x  x x x  x x se",
        "x nw se  x s e  x s x",
        "x s sw  se s w  x s sw",
        "x x e  x x ne  x x e",
        "e s w  x s w  e s w",
        "w w x  w x x  w x x",
        "x x x  x x x  x x s",
        "x s x  sw w w  w w w",
        "nw x x  w x x  w x x",
    ])
}

/// The 5×5 drainage network of the PCRaster manual, as one partition.
pub fn pcraster_network() -> PartitionedArray<FlowDirection> {
    partitioned(
        Shape::new(5, 5),
        Shape::new(5, 5),
        vec![flow(
            "s  s  s  sw sw
             s  s  sw sw sw
             se s  sw w  sw
             se s  sw w  w
             e  p  w  w  w",
        )],
    )
}

/// Every cell of a fixture-shaped array drains towards `direction`.
#[allow(clippy::expect_used)]
pub fn parallel(direction: Direction) -> PartitionedArray<FlowDirection> {
    PartitionedArray::filled(ARRAY_SHAPE, PARTITION_SHAPE, direction.into())
        .expect("fixture layout is valid")
}

/// Outflow of unit inflow over [`parallel`]: the length of the straight
/// stream ending in each cell. Global row-major.
pub fn parallel_outflow(direction: Direction) -> Vec<f64> {
    let (d_row, d_col) = direction.opposite().offset();
    ARRAY_SHAPE
        .cells()
        .map(|cell| {
            let mut length = 1_u32;
            let mut upstream = ARRAY_SHAPE.offset(cell, (d_row, d_col));
            while let Some(cell) = upstream {
                length += 1;
                upstream = ARRAY_SHAPE.offset(cell, (d_row, d_col));
            }
            f64::from(length)
        })
        .collect()
}

/// Builds a random acyclic network from per-cell `keys` and `picks`
/// (global row-major, both of length `shape.nr_cells()`).
///
/// A cell may drain into neighbours with a smaller `(key, index)` pair or
/// off the array edge. `picks` selects among those candidates; one extra
/// choice makes the cell a sink. Streams strictly descend in key order, so
/// the network has no cycles.
pub fn acyclic_network(shape: Shape, keys: &[u32], picks: &[u8]) -> Vec<FlowDirection> {
    let rank = |cell: Cell| {
        let index = shape.linear_index(cell);
        (keys[index], index)
    };
    shape
        .cells()
        .map(|cell| {
            let candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|direction| {
                    shape
                        .offset(cell, direction.offset())
                        .is_none_or(|target| rank(target) < rank(cell))
                })
                .collect();
            let pick = usize::from(picks[shape.linear_index(cell)]) % (candidates.len() + 1);
            candidates
                .get(pick)
                .map_or(FlowDirection::Sink, |direction| (*direction).into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_cover_the_whole_array() {
        for array in [spiral_in(), merging_streams()] {
            assert_eq!(array.nr_partitions(), 9);
            assert_eq!(array.shape(), ARRAY_SHAPE);
        }
        assert_eq!(
            pcraster_network().get(Cell::new(4, 1)),
            Some(&FlowDirection::Sink)
        );
    }

    #[test]
    fn parallel_streams_grow_along_the_flow() {
        let east = parallel_outflow(Direction::East);
        assert_eq!(&east[..9], &[1., 2., 3., 4., 5., 6., 7., 8., 9.]);
        let south_east = parallel_outflow(Direction::SouthEast);
        assert_eq!(south_east[ARRAY_SHAPE.linear_index(Cell::new(2, 5))], 3.0);
    }

    #[test]
    fn random_networks_descend() {
        let shape = Shape::new(3, 3);
        let keys = [5, 4, 3, 6, 0, 2, 7, 8, 1];
        let network = acyclic_network(shape, &keys, &[0; 9]);
        for (index, code) in network.iter().enumerate() {
            let cell = shape.cell_at(index);
            if let Some(target) = code.direction().and_then(|d| shape.offset(cell, d.offset())) {
                assert!(keys[shape.linear_index(target)] < keys[index]);
            }
        }
    }
}
