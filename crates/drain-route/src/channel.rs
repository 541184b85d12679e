// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Directional channel fabric between neighbouring partitions.
//!
//! Every ordered pair of neighbouring partitions gets one unbounded channel.
//! The channel partition `p` sends on towards `direction` is the channel its
//! neighbour in `direction` receives on from `direction.opposite()`.
//! Channels are registered by [`ChannelName`] in a lookup that lives as long
//! as the fabric, which is scoped to one router invocation. Partition tasks
//! claim their endpoints once as a [`Communicator`] and the fabric is torn
//! down after every task has finished.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use drain_grid::{Direction, PartitionLayout};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::RouteError;

/// Identifies the channel partition `partition` sends on towards
/// `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelName {
    /// Sending partition.
    pub partition: usize,
    /// Direction of the receiving neighbour, seen from the sender.
    pub direction: Direction,
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.direction)
    }
}

struct Endpoints<T> {
    sender: Option<UnboundedSender<T>>,
    receiver: Option<UnboundedReceiver<T>>,
}

/// All channels of one kind for one router invocation.
pub struct ChannelFabric<T> {
    scope: String,
    layout: PartitionLayout,
    registry: Mutex<FxHashMap<ChannelName, Endpoints<T>>>,
}

impl<T> ChannelFabric<T> {
    /// Creates one channel per ordered neighbour pair of `layout`. `scope`
    /// prefixes channel names in diagnostics.
    pub fn new(scope: impl Into<String>, layout: PartitionLayout) -> Self {
        let mut registry = FxHashMap::default();
        for partition in 0..layout.nr_partitions() {
            for direction in Direction::ALL {
                if layout.neighbour(partition, direction).is_some() {
                    let (sender, receiver) = mpsc::unbounded_channel();
                    registry.insert(
                        ChannelName {
                            partition,
                            direction,
                        },
                        Endpoints {
                            sender: Some(sender),
                            receiver: Some(receiver),
                        },
                    );
                }
            }
        }
        let scope = scope.into();
        debug!(scope = %scope, channels = registry.len(), "channel fabric created");
        Self {
            scope,
            layout,
            registry: Mutex::new(registry),
        }
    }

    /// Number of registered channels.
    pub fn nr_channels(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Full diagnostic name of a channel.
    pub fn qualified_name(&self, name: ChannelName) -> String {
        format!("{}/{}", self.scope, name)
    }

    /// Claims the send and receive endpoints of `partition`. Endpoints can
    /// be claimed once; later calls return a communicator without them.
    pub fn communicator(&self, partition: usize) -> Communicator<T> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let mut senders: [Option<UnboundedSender<T>>; 8] = std::array::from_fn(|_| None);
        let mut receivers: [Option<UnboundedReceiver<T>>; 8] = std::array::from_fn(|_| None);
        for direction in Direction::ALL {
            let Some(neighbour) = self.layout.neighbour(partition, direction) else {
                continue;
            };
            let outgoing = ChannelName {
                partition,
                direction,
            };
            let incoming = ChannelName {
                partition: neighbour,
                direction: direction.opposite(),
            };
            senders[direction.index()] = registry
                .get_mut(&outgoing)
                .and_then(|endpoints| endpoints.sender.take());
            receivers[direction.index()] = registry
                .get_mut(&incoming)
                .and_then(|endpoints| endpoints.receiver.take());
        }
        Communicator {
            partition,
            senders,
            receivers,
        }
    }

    /// Drops the registry. Returns the number of endpoints that were never
    /// claimed.
    pub fn teardown(self) -> usize {
        let registry = self
            .registry
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let unclaimed = registry
            .values()
            .map(|endpoints| {
                usize::from(endpoints.sender.is_some()) + usize::from(endpoints.receiver.is_some())
            })
            .sum();
        if unclaimed > 0 {
            warn!(scope = %self.scope, unclaimed, "channel fabric torn down with unclaimed endpoints");
        } else {
            debug!(scope = %self.scope, "channel fabric torn down");
        }
        unclaimed
    }
}

/// Endpoints of one partition: a sender towards and a receiver from each
/// live neighbour.
pub struct Communicator<T> {
    partition: usize,
    senders: [Option<UnboundedSender<T>>; 8],
    receivers: [Option<UnboundedReceiver<T>>; 8],
}

impl<T> Communicator<T> {
    /// Splits into the sending and receiving halves.
    pub fn split(self) -> (Outbox<T>, Inbox<T>) {
        (
            Outbox {
                partition: self.partition,
                senders: self.senders,
            },
            Inbox {
                receivers: self.receivers,
            },
        )
    }
}

/// Sending half of a [`Communicator`].
pub struct Outbox<T> {
    partition: usize,
    senders: [Option<UnboundedSender<T>>; 8],
}

impl<T> Outbox<T> {
    /// `true` while the channel towards `direction` is open.
    pub fn is_open(&self, direction: Direction) -> bool {
        self.senders[direction.index()].is_some()
    }

    /// Sends `message` towards `direction`. Without an open channel (array
    /// edge, or already closed) the message is dropped.
    pub fn send(&self, direction: Direction, message: T) -> Result<(), RouteError> {
        match &self.senders[direction.index()] {
            Some(sender) => sender.send(message).map_err(|_| RouteError::NeighbourGone {
                partition: self.partition,
                direction,
            }),
            None => Ok(()),
        }
    }

    /// Closes the channel towards `direction`. The receiver sees the end of
    /// the stream once it has drained what was sent.
    pub fn close(&mut self, direction: Direction) {
        self.senders[direction.index()] = None;
    }
}

/// Receiving half of a [`Communicator`].
pub struct Inbox<T> {
    receivers: [Option<UnboundedReceiver<T>>; 8],
}

impl<T> Inbox<T> {
    /// Takes the receiver for messages from the neighbour in `direction`.
    pub fn take(&mut self, direction: Direction) -> Option<UnboundedReceiver<T>> {
        self.receivers[direction.index()].take()
    }
}

/// Outcome of a bounded receive.
#[derive(Debug)]
pub(crate) enum Received<T> {
    Message(T),
    Closed,
    TimedOut(Duration),
}

/// Receives one message, waiting at most `timeout` (forever on `None`).
pub(crate) async fn receive<T>(
    receiver: &mut UnboundedReceiver<T>,
    timeout: Option<Duration>,
) -> Received<T> {
    let message = match timeout {
        Some(limit) => match tokio::time::timeout(limit, receiver.recv()).await {
            Ok(message) => message,
            Err(_) => return Received::TimedOut(limit),
        },
        None => receiver.recv().await,
    };
    message.map_or(Received::Closed, Received::Message)
}
