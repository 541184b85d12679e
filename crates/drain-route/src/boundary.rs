// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Boundary-cell addressing between neighbouring partitions.
//!
//! A value crossing into a neighbour is addressed by a single index in the
//! neighbour's frame: the column for north/south neighbours, the row for
//! east/west neighbours, and `0` for the corner cell of a diagonal
//! neighbour. Partitions in one partition row share their row extent and
//! partitions in one partition column share their column extent, so the
//! index needs no translation.

use drain_grid::{Cell, Direction, Shape};

/// Where a step out of `cell` lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Inside the same partition.
    Inside(Cell),
    /// In the neighbour towards `neighbour`, at boundary index `index`.
    Outside {
        /// Direction of the neighbouring partition.
        neighbour: Direction,
        /// Boundary index in the neighbour's frame.
        index: usize,
    },
}

/// Follows `direction` from `cell` in a partition of `shape`.
pub(crate) fn step(shape: Shape, cell: Cell, direction: Direction) -> Step {
    let (d_row, d_col) = direction.offset();
    let cross_row = if d_row < 0 && cell.row == 0 {
        -1
    } else if d_row > 0 && cell.row + 1 >= shape.rows {
        1
    } else {
        0
    };
    let cross_col = if d_col < 0 && cell.col == 0 {
        -1
    } else if d_col > 0 && cell.col + 1 >= shape.cols {
        1
    } else {
        0
    };
    let row = cell.row.wrapping_add_signed(d_row);
    let col = cell.col.wrapping_add_signed(d_col);
    match Direction::from_offset(cross_row, cross_col) {
        None => Step::Inside(Cell::new(row, col)),
        Some(neighbour) => {
            let index = if cross_row == 0 {
                row
            } else if cross_col == 0 {
                col
            } else {
                0
            };
            Step::Outside { neighbour, index }
        }
    }
}

/// Local cell addressed by `index` in a message from the neighbour in
/// direction `from`. `None` when the index does not name a boundary cell.
pub(crate) fn entry_cell(shape: Shape, from: Direction, index: usize) -> Option<Cell> {
    let last_row = shape.rows - 1;
    let last_col = shape.cols - 1;
    let cell = match from {
        Direction::North => Cell::new(0, index),
        Direction::South => Cell::new(last_row, index),
        Direction::West => Cell::new(index, 0),
        Direction::East => Cell::new(index, last_col),
        Direction::NorthWest if index == 0 => Cell::new(0, 0),
        Direction::NorthEast if index == 0 => Cell::new(0, last_col),
        Direction::SouthEast if index == 0 => Cell::new(last_row, last_col),
        Direction::SouthWest if index == 0 => Cell::new(last_row, 0),
        _ => return None,
    };
    shape.contains(cell).then_some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: Shape = Shape::new(3, 4);

    #[test]
    fn interior_steps_stay_inside() {
        assert_eq!(
            step(SHAPE, Cell::new(1, 1), Direction::SouthEast),
            Step::Inside(Cell::new(2, 2))
        );
        assert_eq!(
            step(SHAPE, Cell::new(0, 3), Direction::SouthWest),
            Step::Inside(Cell::new(1, 2))
        );
    }

    #[test]
    fn edge_steps_address_the_neighbour_frame() {
        assert_eq!(
            step(SHAPE, Cell::new(0, 2), Direction::North),
            Step::Outside {
                neighbour: Direction::North,
                index: 2
            }
        );
        // Diagonal step across a side lands next to the source column.
        assert_eq!(
            step(SHAPE, Cell::new(2, 1), Direction::SouthEast),
            Step::Outside {
                neighbour: Direction::South,
                index: 2
            }
        );
        assert_eq!(
            step(SHAPE, Cell::new(1, 3), Direction::NorthEast),
            Step::Outside {
                neighbour: Direction::East,
                index: 0
            }
        );
        assert_eq!(
            step(SHAPE, Cell::new(2, 3), Direction::SouthEast),
            Step::Outside {
                neighbour: Direction::SouthEast,
                index: 0
            }
        );
    }

    #[test]
    fn entry_mirrors_step() {
        // A neighbour of the same extent receives on the opposite side.
        for cell in SHAPE.cells() {
            for direction in Direction::ALL {
                if let Step::Outside { neighbour, index } = step(SHAPE, cell, direction) {
                    let entered = entry_cell(SHAPE, neighbour.opposite(), index).unwrap();
                    assert!(SHAPE.contains(entered));
                    let (d_row, d_col) = direction.offset();
                    // Wrap the source cell into the next tile and compare.
                    let rows = SHAPE.rows as isize;
                    let cols = SHAPE.cols as isize;
                    let row = (cell.row as isize + d_row).rem_euclid(rows) as usize;
                    let col = (cell.col as isize + d_col).rem_euclid(cols) as usize;
                    assert_eq!(entered, Cell::new(row, col), "{cell} -> {direction}");
                }
            }
        }
    }

    #[test]
    fn invalid_indices_are_rejected() {
        assert_eq!(entry_cell(SHAPE, Direction::North, 4), None);
        assert_eq!(entry_cell(SHAPE, Direction::West, 3), None);
        assert_eq!(entry_cell(SHAPE, Direction::SouthEast, 1), None);
        assert_eq!(entry_cell(SHAPE, Direction::SouthEast, 0), Some(Cell::new(2, 3)));
    }
}
