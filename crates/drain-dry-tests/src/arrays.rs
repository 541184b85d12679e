// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flow-direction shorthand and NaN-aware comparisons.

use std::fmt::Debug;

use drain_grid::{Direction, FlowDirection, NoData, PartitionedArray, Shape};

/// Parses whitespace-separated flow-direction tokens: compass names
/// (`n`, `ne`, `e`, `se`, `s`, `sw`, `w`, `nw`), `p` for a sink (pit) and
/// `x` for no-data.
///
/// # Panics
/// On any other token.
#[allow(clippy::panic)]
pub fn flow(tokens: &str) -> Vec<FlowDirection> {
    tokens
        .split_whitespace()
        .map(|token| match token {
            "n" => FlowDirection::Towards(Direction::North),
            "ne" => FlowDirection::Towards(Direction::NorthEast),
            "e" => FlowDirection::Towards(Direction::East),
            "se" => FlowDirection::Towards(Direction::SouthEast),
            "s" => FlowDirection::Towards(Direction::South),
            "sw" => FlowDirection::Towards(Direction::SouthWest),
            "w" => FlowDirection::Towards(Direction::West),
            "nw" => FlowDirection::Towards(Direction::NorthWest),
            "p" => FlowDirection::Sink,
            "x" => FlowDirection::NoData,
            other => panic!("unknown flow-direction token {other:?}"),
        })
        .collect()
}

/// Assembles a fixture array from one value list per partition.
///
/// # Panics
/// If the lists do not fit the layout.
#[allow(clippy::expect_used)]
pub fn partitioned<T>(
    array_shape: Shape,
    partition_shape: Shape,
    values: Vec<Vec<T>>,
) -> PartitionedArray<T> {
    PartitionedArray::from_partition_values(array_shape, partition_shape, values)
        .expect("fixture values must match the layout")
}

/// Asserts that `got` equals `want` cell by cell, treating two no-data
/// values as equal. Reports the first differing index.
pub fn assert_cells_eq<T: NoData + PartialEq + Debug>(got: &[T], want: &[T]) {
    assert_eq!(got.len(), want.len(), "cell count differs");
    for (index, (g, w)) in got.iter().zip(want).enumerate() {
        let same = (g.is_no_data() && w.is_no_data()) || g == w;
        assert!(same, "cell {index}: got {g:?}, want {w:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_follow_compass_names() {
        let parsed = flow("n se p x");
        assert_eq!(
            parsed,
            vec![
                FlowDirection::Towards(Direction::North),
                FlowDirection::Towards(Direction::SouthEast),
                FlowDirection::Sink,
                FlowDirection::NoData,
            ]
        );
    }

    #[test]
    fn no_data_compares_equal() {
        assert_cells_eq(&[1.0, f64::NAN], &[1.0, f64::NAN]);
    }

    #[test]
    #[should_panic(expected = "cell 1")]
    fn differing_cell_is_reported() {
        assert_cells_eq(&[1.0_f32, 2.0], &[1.0, f32::NAN]);
    }
}
