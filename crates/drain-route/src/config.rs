// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Router configuration and its storage port.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which [`RouterConfig`] is stored.
pub const ROUTER_CONFIG_KEY: &str = "router";

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A stored value parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// What to do with input values outside an operation's domain (negative
/// material, negative thresholds, fractions outside `[0, 1]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainViolation {
    /// Turn the affected outputs into no-data and carry on.
    #[default]
    MarkNoData,
    /// Fail the operation with [`RouteError::OutOfDomain`](crate::RouteError::OutOfDomain).
    Reject,
}

/// Default [`RouterConfig::stall_timeout_ms`]: ten minutes.
pub const DEFAULT_STALL_TIMEOUT_MS: u64 = 600_000;

/// Tunables for [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Longest a partition waits on one receive before failing with
    /// [`RouteError::Stalled`](crate::RouteError::Stalled). `None` waits
    /// forever.
    ///
    /// The limit applies to every wait separately, not to the whole run.
    /// A partition waiting on a long chain of upstream partitions waits as
    /// long as that chain takes to route, so the limit must exceed the
    /// slowest such chain or valid runs fail. Cross-partition cycles are
    /// only detected through this limit.
    pub stall_timeout_ms: Option<u64>,
    /// Handling of out-of-domain inputs.
    pub domain_violation: DomainViolation,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            stall_timeout_ms: Some(DEFAULT_STALL_TIMEOUT_MS),
            domain_violation: DomainViolation::MarkNoData,
        }
    }
}

impl RouterConfig {
    /// Stall timeout as a duration.
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_ms.map(Duration::from_millis)
    }

    /// Builder-style stall timeout override.
    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout_ms =
            timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Builder-style domain policy override.
    pub fn with_domain_violation(mut self, policy: DomainViolation) -> Self {
        self.domain_violation = policy;
        self
    }

    /// Rejects settings the router cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stall_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "stall_timeout_ms must be positive; use null to wait forever".into(),
            ));
        }
        Ok(())
    }

    /// Loads the config from `store`, falling back to defaults when nothing
    /// is stored. Loaded values are validated.
    pub fn load<S: ConfigStore>(store: &S) -> Result<Self, ConfigError> {
        let config = match store.load_raw(ROUTER_CONFIG_KEY) {
            Ok(bytes) if bytes.is_empty() => Self::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(ConfigError::NotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config as pretty JSON into `store`.
    pub fn save<S: ConfigStore>(&self, store: &S) -> Result<(), ConfigError> {
        self.validate()?;
        let data = serde_json::to_vec_pretty(self)?;
        store.save_raw(ROUTER_CONFIG_KEY, &data)
    }
}
