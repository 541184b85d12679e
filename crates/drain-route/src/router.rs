// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-level entry point: one task per partition, results assembled into
//! whole arrays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use drain_grid::{FlowDirection, PartitionData, PartitionLayout, PartitionedArray};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::accumulator::{Accumulation, CellAccumulator};
use crate::channel::ChannelFabric;
use crate::config::RouterConfig;
use crate::material::{Argument, Material};
use crate::partition::{count_partition, solve_partition, PartitionTask, TaskSettings};
use crate::policy::{
    Accumulate, AccumulateFraction, AccumulateThreshold, CellClass, ClassifyCells,
    PartialAccumulate,
};
use crate::RouteError;

/// Distinguishes channel names of concurrent invocations.
static INVOCATION: AtomicU64 = AtomicU64::new(0);

fn next_invocation() -> u64 {
    INVOCATION.fetch_add(1, Ordering::Relaxed)
}

/// Runs routing operations over partitioned flow-direction arrays.
///
/// Operations must be awaited inside a tokio runtime; each partition is
/// solved by its own spawned task, so a multi-threaded runtime solves
/// partitions in parallel.
#[derive(Debug, Clone, Default)]
pub struct Router {
    config: RouterConfig,
}

impl Router {
    /// Creates a router, validating `config`.
    pub fn new(config: RouterConfig) -> Result<Self, RouteError> {
        config
            .validate()
            .map_err(|err| RouteError::InvalidConfig(err.to_string()))?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Accumulates `inflow` along the drainage network. Returns the outflow
    /// of every cell: its own inflow plus everything upstream.
    pub async fn accumulate<M: Material>(
        &self,
        flow_direction: &PartitionedArray<FlowDirection>,
        inflow: impl Into<Argument<M>>,
    ) -> Result<PartitionedArray<M>, RouteError> {
        let accumulation = Accumulate::new(inflow);
        check_arguments(flow_direction.layout(), accumulation.arguments())?;
        let outflow = self.run(&accumulation, flow_direction).await?;
        Ok(PartitionedArray::from_partitions(
            *flow_direction.layout(),
            outflow,
        )?)
    }

    /// Accumulates `inflow`, retaining up to `threshold` in every cell.
    /// Returns `(outflow, remainder)`.
    pub async fn accumulate_threshold<M: Material>(
        &self,
        flow_direction: &PartitionedArray<FlowDirection>,
        inflow: impl Into<Argument<M>>,
        threshold: impl Into<Argument<M>>,
    ) -> Result<(PartitionedArray<M>, PartitionedArray<M>), RouteError> {
        let accumulation = AccumulateThreshold::new(inflow, threshold);
        check_arguments(flow_direction.layout(), accumulation.arguments())?;
        let outputs = self.run(&accumulation, flow_direction).await?;
        assemble_split(*flow_direction.layout(), outputs)
    }

    /// Accumulates `inflow`, passing on `fraction` of what reaches every
    /// cell. Returns `(outflow, remainder)`.
    pub async fn accumulate_fraction<M: Material>(
        &self,
        flow_direction: &PartitionedArray<FlowDirection>,
        inflow: impl Into<Argument<M>>,
        fraction: impl Into<Argument<M>>,
    ) -> Result<(PartitionedArray<M>, PartitionedArray<M>), RouteError> {
        let accumulation = AccumulateFraction::new(inflow, fraction);
        check_arguments(flow_direction.layout(), accumulation.arguments())?;
        let outputs = self.run(&accumulation, flow_direction).await?;
        assemble_split(*flow_direction.layout(), outputs)
    }

    /// Tags every cell with its role in the routing.
    pub async fn classify_cells(
        &self,
        flow_direction: &PartitionedArray<FlowDirection>,
    ) -> Result<PartitionedArray<CellClass>, RouteError> {
        let classes = self.run(&ClassifyCells, flow_direction).await?;
        Ok(PartitionedArray::from_partitions(
            *flow_direction.layout(),
            classes,
        )?)
    }

    /// Steps from the furthest ridge upstream of every cell, up to
    /// `nr_steps`. Cells further downstream are no-data (`u32::MAX`).
    pub async fn partial_accumulate(
        &self,
        flow_direction: &PartitionedArray<FlowDirection>,
        nr_steps: u32,
    ) -> Result<PartitionedArray<u32>, RouteError> {
        let steps = self
            .run(&PartialAccumulate::new(nr_steps), flow_direction)
            .await?;
        Ok(PartitionedArray::from_partitions(
            *flow_direction.layout(),
            steps,
        )?)
    }

    /// Number of cells draining directly into each cell, across partition
    /// boundaries. No-data flow directions yield `u8::MAX`.
    #[instrument(name = "router", skip_all, fields(operation = "inflow_count"))]
    pub async fn inflow_count(
        &self,
        flow_direction: &PartitionedArray<FlowDirection>,
    ) -> Result<PartitionedArray<u8>, RouteError> {
        let layout = *flow_direction.layout();
        let invocation = next_invocation();
        let registration =
            ChannelFabric::new(format!("inflow_count/{invocation}/inflow_count"), layout);
        let stall_timeout = self.config.stall_timeout();
        let handles: Vec<_> = flow_direction
            .partitions()
            .iter()
            .enumerate()
            .map(|(partition, flow)| {
                tokio::spawn(count_partition(
                    partition,
                    Arc::clone(flow),
                    registration.communicator(partition),
                    stall_timeout,
                ))
            })
            .collect();
        let outcome = join_partitions(handles).await;
        registration.teardown();
        Ok(PartitionedArray::from_partitions(layout, outcome?)?)
    }

    /// Routes `accumulation` over `flow_direction` and returns the result of
    /// every partition, in layout order.
    ///
    /// This is the generic entry point behind the named operations; it
    /// accepts any [`Accumulation`]. Arguments of the accumulation are
    /// assumed to be tiled like `flow_direction`.
    #[instrument(name = "router", skip_all, fields(operation = accumulation.name()))]
    pub async fn run<A: Accumulation>(
        &self,
        accumulation: &A,
        flow_direction: &PartitionedArray<FlowDirection>,
    ) -> Result<Vec<<A::Accumulator as CellAccumulator>::Output>, RouteError> {
        let layout = *flow_direction.layout();
        let operation = accumulation.name();
        let invocation = next_invocation();
        let scope = format!("{operation}/{invocation}");
        let registration = ChannelFabric::new(format!("{scope}/inflow_count"), layout);
        let material = ChannelFabric::new(format!("{scope}/material"), layout);
        let settings = TaskSettings {
            operation,
            stall_timeout: self.config.stall_timeout(),
            domain_violation: self.config.domain_violation,
        };

        let started = Instant::now();
        info!(
            invocation,
            partitions = layout.nr_partitions(),
            shape = %layout.array_shape(),
            "routing started"
        );
        let handles: Vec<_> = flow_direction
            .partitions()
            .iter()
            .enumerate()
            .map(|(partition, flow)| {
                tokio::spawn(solve_partition(PartitionTask {
                    partition,
                    flow_direction: Arc::clone(flow),
                    accumulator: accumulation.accumulator(partition, flow.shape()),
                    registration: registration.communicator(partition),
                    material: material.communicator(partition),
                    settings,
                }))
            })
            .collect();
        let outcome = join_partitions(handles).await;

        // Every task is done; nothing references the fabric any more.
        registration.teardown();
        material.teardown();

        match &outcome {
            Ok(_) => info!(invocation, elapsed = ?started.elapsed(), "routing finished"),
            Err(err) => warn!(invocation, %err, "routing failed"),
        }
        outcome
    }
}

fn check_arguments<M: Material, const N: usize>(
    layout: &PartitionLayout,
    arguments: [(&'static str, &Argument<M>); N],
) -> Result<(), RouteError> {
    arguments
        .into_iter()
        .try_for_each(|(name, argument)| argument.check_layout(name, layout))
}

fn assemble_split<M: Material>(
    layout: PartitionLayout,
    outputs: Vec<(PartitionData<M>, PartitionData<M>)>,
) -> Result<(PartitionedArray<M>, PartitionedArray<M>), RouteError> {
    let (outflow, remainder): (Vec<_>, Vec<_>) = outputs.into_iter().unzip();
    Ok((
        PartitionedArray::from_partitions(layout, outflow)?,
        PartitionedArray::from_partitions(layout, remainder)?,
    ))
}

/// Awaits every partition task. On failure reports the root cause: the
/// first error that is not merely a neighbour reacting to another failure.
async fn join_partitions<T>(
    handles: Vec<JoinHandle<Result<T, RouteError>>>,
) -> Result<Vec<T>, RouteError> {
    let mut outputs = Vec::with_capacity(handles.len());
    let mut failure: Option<RouteError> = None;
    for (partition, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap_or_else(|err| {
            Err(RouteError::TaskFailed {
                partition,
                reason: err.to_string(),
            })
        });
        match outcome {
            Ok(output) => outputs.push(output),
            Err(err) => failure = Some(root_cause(failure, err)),
        }
    }
    failure.map_or(Ok(outputs), Err)
}

fn root_cause(current: Option<RouteError>, candidate: RouteError) -> RouteError {
    match current {
        Some(current) if !current.is_secondary() || candidate.is_secondary() => current,
        _ => candidate,
    }
}
