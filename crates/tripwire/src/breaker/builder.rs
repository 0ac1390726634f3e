// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use tick::Clock;

use super::constants::{DEFAULT_COOLDOWN, DEFAULT_NAME, DEFAULT_PROBE_LIMIT};
use super::engine::EngineOptions;
use super::telemetry::BreakerTelemetry;
use super::{Breaker, Fuse};

/// Builds a [`Breaker`].
///
/// Created by [`Breaker::builder`] or [`BreakerConfig::builder`][super::BreakerConfig::builder].
/// Every setting other than the fuse and the clock has a default; see the
/// [module documentation][super#defaults].
#[derive(Debug, Clone)]
pub struct BreakerBuilder {
    fuse: Fuse,
    clock: Clock,
    cooldown: Duration,
    probe_limit: u64,
    name: Cow<'static, str>,
    #[cfg(any(feature = "metrics", test))]
    event_counter: opentelemetry::metrics::Counter<u64>,
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
}

impl BreakerBuilder {
    pub(crate) fn new(fuse: Fuse, clock: &Clock) -> Self {
        Self {
            fuse,
            clock: clock.clone(),
            cooldown: DEFAULT_COOLDOWN,
            probe_limit: DEFAULT_PROBE_LIMIT,
            name: Cow::Borrowed(DEFAULT_NAME),
            #[cfg(any(feature = "metrics", test))]
            event_counter: crate::telemetry::metrics::event_counter(opentelemetry::global::meter_provider().as_ref()),
            #[cfg(any(feature = "logs", test))]
            logs_enabled: false,
        }
    }

    /// Sets how long the breaker stays open before it admits probes.
    ///
    /// Any duration is accepted. A cooldown longer than the clock can measure keeps the breaker
    /// open once it trips.
    ///
    /// **Default**: 10 seconds
    #[must_use]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets how many probes run concurrently while half-open, and how many consecutive
    /// successful probes close the breaker.
    ///
    /// Values below `1` are raised to `1`.
    ///
    /// **Default**: 1
    #[must_use]
    pub fn probe_limit(mut self, probe_limit: u64) -> Self {
        self.probe_limit = probe_limit.max(1);
        self
    }

    /// Sets the name reported in telemetry. Prefer `snake_case`, e.g. `inventory_db`.
    ///
    /// **Default**: `default`
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the global meter provider used to report breaker events.
    #[must_use]
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn meter_provider(mut self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        self.event_counter = crate::telemetry::metrics::event_counter(provider);
        self
    }

    /// Enables structured logs for transitions and rejections.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
    pub fn enable_logs(mut self) -> Self {
        self.logs_enabled = true;
        self
    }

    /// Builds the breaker. It starts closed, with an empty counter.
    #[must_use]
    pub fn build(self) -> Breaker {
        let telemetry = BreakerTelemetry {
            #[cfg(any(feature = "metrics", test))]
            event_reporter: Some(self.event_counter),
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
            name: self.name,
        };

        let options = EngineOptions {
            fuse: self.fuse,
            cooldown: self.cooldown,
            probe_limit: self.probe_limit,
        };

        Breaker::from_parts(options, self.clock, telemetry)
    }
}
