// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tick::Clock;

use super::constants::{DEFAULT_COOLDOWN, DEFAULT_PROBE_LIMIT};
use super::{Breaker, BreakerBuilder, Fuse};

/// Serializable configuration of a [`Breaker`].
///
/// Only `fuse` is required; the other fields take their defaults when missing.
///
/// ```rust
/// # use tick::Clock;
/// use tripwire::breaker::{BreakerConfig, FuseConfig};
///
/// # fn example(clock: Clock) -> Result<(), serde_json::Error> {
/// let config: BreakerConfig = serde_json::from_str(r#"{ "fuse": { "rate": 25 }, "cooldown_ms": 5000 }"#)?;
/// assert_eq!(config.fuse, FuseConfig::Rate(25));
///
/// let _breaker = config.builder(&clock).name("search_index").build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakerConfig {
    /// The trip policy.
    pub fuse: FuseConfig,

    /// How long the breaker stays open, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Number of probes admitted while half-open.
    #[serde(default = "default_probe_limit")]
    pub probe_limit: u64,
}

/// Serializable form of a built-in [`Fuse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuseConfig {
    /// See [`Fuse::threshold`].
    Threshold(u64),
    /// See [`Fuse::consecutive`].
    Consecutive(u64),
    /// See [`Fuse::rate`].
    Rate(u64),
}

impl BreakerConfig {
    /// Creates a configuration with the given fuse and default settings.
    #[must_use]
    pub fn new(fuse: FuseConfig) -> Self {
        Self {
            fuse,
            cooldown_ms: default_cooldown_ms(),
            probe_limit: default_probe_limit(),
        }
    }

    /// Returns a builder preloaded with this configuration.
    ///
    /// Telemetry settings are not part of the configuration and can be added to the builder.
    #[must_use]
    pub fn builder(&self, clock: &Clock) -> BreakerBuilder {
        Breaker::builder(self.fuse.into(), clock)
            .cooldown(Duration::from_millis(self.cooldown_ms))
            .probe_limit(self.probe_limit)
    }
}

impl From<FuseConfig> for Fuse {
    fn from(config: FuseConfig) -> Self {
        match config {
            FuseConfig::Threshold(count) => Self::threshold(count),
            FuseConfig::Consecutive(count) => Self::consecutive(count),
            FuseConfig::Rate(percent) => Self::rate(percent),
        }
    }
}

fn default_cooldown_ms() -> u64 {
    u64::try_from(DEFAULT_COOLDOWN.as_millis()).unwrap_or(u64::MAX)
}

const fn default_probe_limit() -> u64 {
    DEFAULT_PROBE_LIMIT
}
