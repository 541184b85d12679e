// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Partition task and inter-partition monitors.
//!
//! A partition task routes everything it can on its own first: after the
//! inflow-count pass it starts a stream at every ridge cell. What is left
//! waits on values from neighbouring partitions. One monitor task per
//! direction with registered inputs receives those values and resumes
//! streams as cells become ready. All monitors of a partition share the
//! partition's [`Traversal`] behind one mutex.

use std::sync::Arc;
use std::time::Duration;

use drain_grid::{Cell, Direction, FlowDirection, PartitionData, Shape};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::accumulator::{CellAccumulator, StreamOrigin};
use crate::boundary::entry_cell;
use crate::channel::{receive, Communicator, Received};
use crate::config::DomainViolation;
use crate::inflow_count::{self, Connectivity, Registration};
use crate::traversal::{Message, Traversal};
use crate::RouteError;

/// Settings shared by all partition tasks of one invocation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TaskSettings {
    pub(crate) operation: &'static str,
    pub(crate) stall_timeout: Option<Duration>,
    pub(crate) domain_violation: DomainViolation,
}

/// Inputs of one partition task.
pub(crate) struct PartitionTask<A: CellAccumulator> {
    pub(crate) partition: usize,
    pub(crate) flow_direction: Arc<PartitionData<FlowDirection>>,
    pub(crate) accumulator: A,
    pub(crate) registration: Communicator<Registration>,
    pub(crate) material: Communicator<Message<A::Value>>,
    pub(crate) settings: TaskSettings,
}

/// Runs only the inflow-count pass of one partition.
#[instrument(name = "inflow_count", skip_all, fields(partition = partition))]
pub(crate) async fn count_partition(
    partition: usize,
    flow_direction: Arc<PartitionData<FlowDirection>>,
    registration: Communicator<Registration>,
    stall_timeout: Option<Duration>,
) -> Result<PartitionData<u8>, RouteError> {
    let connectivity =
        inflow_count::connectivity(partition, &flow_direction, registration, stall_timeout)
            .await?;
    Ok(inflow_count::reported_counts(
        &flow_direction,
        &connectivity.inflow_count,
    ))
}

/// Routes one partition to completion.
#[instrument(
    name = "partition",
    skip_all,
    fields(operation = task.settings.operation, partition = task.partition)
)]
pub(crate) async fn solve_partition<A: CellAccumulator>(
    task: PartitionTask<A>,
) -> Result<A::Output, RouteError> {
    let PartitionTask {
        partition,
        flow_direction,
        accumulator,
        registration,
        material,
        settings,
    } = task;
    let shape = flow_direction.shape();

    let Connectivity {
        inflow_count,
        mut inputs,
        outputs,
    } = inflow_count::connectivity(
        partition,
        &flow_direction,
        registration,
        settings.stall_timeout,
    )
    .await?;

    let (outbox, mut inbox) = material.split();
    let mut traversal = Traversal::new(
        partition,
        flow_direction,
        inflow_count,
        outputs,
        outbox,
        accumulator,
    );

    // Ridges come from the initial counts; streams lower the counts of the
    // cells they pass.
    let ridges = traversal.prepare();
    for cell in &ridges {
        traversal.solve_from(*cell, StreamOrigin::Ridge)?;
    }
    debug!(partition, ridges = ridges.len(), "intra-partition pass done");

    let traversal = Arc::new(Mutex::new(traversal));
    let mut monitors = JoinSet::new();
    for direction in Direction::ALL {
        let pending = std::mem::take(&mut inputs[direction.index()]);
        if pending.is_empty() {
            continue;
        }
        let Some(receiver) = inbox.take(direction) else {
            return Err(RouteError::ChannelClosed {
                partition,
                direction,
                stage: "material",
                pending: pending.values().map(|n| usize::from(*n)).sum(),
            });
        };
        monitors.spawn(monitor(
            MonitorSite {
                partition,
                direction,
                shape,
                stall_timeout: settings.stall_timeout,
            },
            receiver,
            pending,
            Arc::clone(&traversal),
        ));
    }
    // Receivers of directions without registered inputs are not needed.
    drop(inbox);

    let mut failure = None;
    while let Some(joined) = monitors.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() && failure.is_some() => continue,
            Err(err) => Err(RouteError::TaskFailed {
                partition,
                reason: err.to_string(),
            }),
        };
        if let Err(err) = outcome {
            if failure.is_none() {
                monitors.abort_all();
                failure = Some(err);
            }
        }
    }
    if let Some(err) = failure {
        return Err(err);
    }

    let traversal = Arc::try_unwrap(traversal)
        .map_err(|_| RouteError::TaskFailed {
            partition,
            reason: "partition state still shared after monitors finished".into(),
        })?
        .into_inner();
    let accumulator = traversal.finish()?;

    let report = accumulator.domain_report();
    if let Some(cell) = report.first {
        match settings.domain_violation {
            DomainViolation::Reject => {
                return Err(RouteError::OutOfDomain {
                    operation: settings.operation,
                    partition,
                    cell,
                })
            }
            DomainViolation::MarkNoData => warn!(
                partition,
                cells = report.count,
                first = %cell,
                "out-of-domain input marked as no-data"
            ),
        }
    }
    Ok(accumulator.into_output())
}

/// What a monitor listens to.
#[derive(Debug, Clone, Copy)]
struct MonitorSite {
    partition: usize,
    direction: Direction,
    shape: Shape,
    stall_timeout: Option<Duration>,
}

/// Consumes the values registered for one direction.
async fn monitor<A: CellAccumulator>(
    site: MonitorSite,
    mut receiver: UnboundedReceiver<Message<A::Value>>,
    mut pending: FxHashMap<Cell, u8>,
    traversal: Arc<Mutex<Traversal<A>>>,
) -> Result<(), RouteError> {
    let MonitorSite {
        partition,
        direction,
        shape,
        stall_timeout,
    } = site;
    let mut remaining: usize = pending.values().map(|n| usize::from(*n)).sum();
    while remaining > 0 {
        let (index, along, value) = match receive(&mut receiver, stall_timeout).await {
            Received::Message(message) => message,
            Received::Closed => {
                return Err(RouteError::ChannelClosed {
                    partition,
                    direction,
                    stage: "material",
                    pending: remaining,
                })
            }
            Received::TimedOut(waited) => {
                return Err(RouteError::Stalled {
                    partition,
                    direction,
                    stage: "material",
                    pending: remaining,
                    waited,
                })
            }
        };
        let cell = entry_cell(shape, direction, index).ok_or(RouteError::InvalidBoundaryIndex {
            partition,
            direction,
            index,
        })?;
        match pending.get_mut(&cell) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                pending.remove(&cell);
            }
            None => {
                return Err(RouteError::UnexpectedInput {
                    partition,
                    direction,
                    cell,
                })
            }
        }
        remaining -= 1;
        traversal
            .lock()
            .await
            .receive(direction, cell, along, value)?;
    }
    debug!(partition, %direction, "monitor drained its inputs");
    Ok(())
}
