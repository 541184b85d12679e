// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compass directions and D8 flow-direction codes.

use std::fmt;

/// One of the eight compass directions around a cell or partition.
///
/// Rows grow southward and columns grow eastward, so north is `(-1, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Up.
    North,
    /// Up and right.
    NorthEast,
    /// Right.
    East,
    /// Down and right.
    SouthEast,
    /// Down.
    South,
    /// Down and left.
    SouthWest,
    /// Left.
    West,
    /// Up and left.
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north. [`index`](Self::index) is the
    /// position in this array.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Position of this direction in [`ALL`](Self::ALL).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `(d_row, d_col)` step towards this direction.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::North => (-1, 0),
            Self::NorthEast => (-1, 1),
            Self::East => (0, 1),
            Self::SouthEast => (1, 1),
            Self::South => (1, 0),
            Self::SouthWest => (1, -1),
            Self::West => (0, -1),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Direction whose offset is `(d_row, d_col)`; `None` for `(0, 0)` or
    /// steps longer than one cell.
    pub const fn from_offset(d_row: isize, d_col: isize) -> Option<Self> {
        Some(match (d_row, d_col) {
            (-1, 0) => Self::North,
            (-1, 1) => Self::NorthEast,
            (0, 1) => Self::East,
            (1, 1) => Self::SouthEast,
            (1, 0) => Self::South,
            (1, -1) => Self::SouthWest,
            (0, -1) => Self::West,
            (-1, -1) => Self::NorthWest,
            _ => return None,
        })
    }

    /// The direction pointing back.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Short lowercase name, also used in channel names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::NorthEast => "north-east",
            Self::East => "east",
            Self::SouthEast => "south-east",
            Self::South => "south",
            Self::SouthWest => "south-west",
            Self::West => "west",
            Self::NorthWest => "north-west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-cell drainage code: the neighbour a cell drains into, a sink, or
/// no-data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowDirection {
    /// Drains into the neighbour in the given direction.
    Towards(Direction),
    /// Drains nowhere; terminal for its stream.
    Sink,
    /// Unknown. The cell takes part in no stream.
    #[default]
    NoData,
}

impl FlowDirection {
    /// Decodes the D8 keypad (LDD) convention: `1`=SW, `2`=S, `3`=SE, `4`=W,
    /// `5`=sink, `6`=E, `7`=NW, `8`=N, `9`=NE. Every other code is no-data.
    pub const fn from_ldd(code: u8) -> Self {
        match code {
            1 => Self::Towards(Direction::SouthWest),
            2 => Self::Towards(Direction::South),
            3 => Self::Towards(Direction::SouthEast),
            4 => Self::Towards(Direction::West),
            5 => Self::Sink,
            6 => Self::Towards(Direction::East),
            7 => Self::Towards(Direction::NorthWest),
            8 => Self::Towards(Direction::North),
            9 => Self::Towards(Direction::NorthEast),
            _ => Self::NoData,
        }
    }

    /// Encodes using the D8 keypad convention; no-data becomes `255`.
    pub const fn to_ldd(self) -> u8 {
        match self {
            Self::Towards(Direction::SouthWest) => 1,
            Self::Towards(Direction::South) => 2,
            Self::Towards(Direction::SouthEast) => 3,
            Self::Towards(Direction::West) => 4,
            Self::Sink => 5,
            Self::Towards(Direction::East) => 6,
            Self::Towards(Direction::NorthWest) => 7,
            Self::Towards(Direction::North) => 8,
            Self::Towards(Direction::NorthEast) => 9,
            Self::NoData => u8::MAX,
        }
    }

    /// Direction drained into, if the cell drains at all.
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Towards(direction) => Some(direction),
            Self::Sink | Self::NoData => None,
        }
    }
}

impl From<Direction> for FlowDirection {
    fn from(direction: Direction) -> Self {
        Self::Towards(direction)
    }
}
