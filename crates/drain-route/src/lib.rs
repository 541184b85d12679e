// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Partition-parallel flow routing over D8 drainage networks.
//!
//! Material is routed along a flow-direction array whose cells each drain
//! into one of their eight neighbours (or nowhere, at sinks). The array is
//! cut into partitions and every partition is solved by its own tokio task:
//!
//! 1. **Inflow count.** Each partition counts the contributions every cell
//!    is owed and exchanges one registration message with each neighbour,
//!    so both sides know which boundary cells will carry traffic.
//! 2. **Intra-partition pass.** Streams start at ridge cells (count zero)
//!    and run downstream until a sink, the partition edge, or a junction
//!    still waiting for other contributions.
//! 3. **Inter-partition pass.** Values crossing into the partition arrive
//!    over per-direction channels. One monitor task per direction folds
//!    them in and resumes streams whose last contribution arrived.
//!
//! What happens at each cell is up to a [`CellAccumulator`] policy; see
//! [`policy`] for the provided ones.
//!
//! ```
//! use drain_grid::{Direction, FlowDirection, PartitionedArray, Shape};
//! use drain_route::Router;
//!
//! # tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap().block_on(async {
//! let flow = PartitionedArray::filled(
//!     Shape::new(4, 4),
//!     Shape::new(2, 2),
//!     FlowDirection::Towards(Direction::East),
//! )?;
//! let outflow: PartitionedArray<f64> = Router::default().accumulate(&flow, 1.0).await?;
//! assert_eq!(&outflow.to_dense()[..4], &[1.0, 2.0, 3.0, 4.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```
#![forbid(unsafe_code)]

mod accumulator;
mod boundary;
pub mod channel;
pub mod config;
mod error;
mod inflow_count;
mod material;
mod partition;
pub mod policy;
mod router;
mod traversal;

pub use accumulator::{Accumulation, CellAccumulator, DomainReport, StreamExit, StreamOrigin};
pub use config::{ConfigError, ConfigStore, DomainViolation, RouterConfig};
pub use error::RouteError;
pub use material::{Argument, Material, Scalar};
pub use policy::CellClass;
pub use router::Router;
