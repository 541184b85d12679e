// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! No-data markers for cell element types.

use crate::FlowDirection;

/// Element types with a distinguished "no data" value.
pub trait NoData: Copy {
    /// The marker value.
    const NO_DATA: Self;

    /// `true` when `self` is the marker.
    fn is_no_data(self) -> bool;
}

impl NoData for f32 {
    const NO_DATA: Self = Self::NAN;

    fn is_no_data(self) -> bool {
        self.is_nan()
    }
}

impl NoData for f64 {
    const NO_DATA: Self = Self::NAN;

    fn is_no_data(self) -> bool {
        self.is_nan()
    }
}

/// Counts use the largest value as marker; a cell never has that many
/// contributions.
impl NoData for u8 {
    const NO_DATA: Self = Self::MAX;

    fn is_no_data(self) -> bool {
        self == Self::MAX
    }
}

/// Step counts likewise; no stream is that long.
impl NoData for u32 {
    const NO_DATA: Self = Self::MAX;

    fn is_no_data(self) -> bool {
        self == Self::MAX
    }
}

impl NoData for FlowDirection {
    const NO_DATA: Self = Self::NoData;

    fn is_no_data(self) -> bool {
        matches!(self, Self::NoData)
    }
}
