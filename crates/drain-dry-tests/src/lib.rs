// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for drain crates.
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`arrays`] - Flow-direction shorthand and NaN-aware comparisons
//! - [`networks`] - Canonical drainage networks and their reference results
#![forbid(unsafe_code)]

pub mod arrays;
pub mod config;
pub mod networks;

pub use arrays::{assert_cells_eq, flow, partitioned};
pub use config::InMemoryConfigStore;
pub use networks::{
    acyclic_network, merging_streams, parallel, parallel_outflow, pcraster_network, spiral_in,
    spiral_in_outflow, ARRAY_SHAPE, PARTITION_SHAPE,
};
