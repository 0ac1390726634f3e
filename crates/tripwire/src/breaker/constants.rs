// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default duration that the breaker stays open before it lets probes through.
pub(crate) const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Default number of probes admitted while the breaker is half-open.
pub(crate) const DEFAULT_PROBE_LIMIT: u64 = 1;

/// Name reported in telemetry when the breaker is not given one.
pub(crate) const DEFAULT_NAME: &str = "default";

/// Upper bound of a failure rate expressed in percent.
pub(crate) const MAX_RATE_PERCENT: u64 = 100;
