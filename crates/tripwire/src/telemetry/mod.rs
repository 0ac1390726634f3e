// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Well-known telemetry keys.
//!
//! Breakers report through a single `resilience.event` counter. The keys below are the
//! attributes attached to each data point; the same names are used as fields of the structured
//! `tracing` events emitted when the `logs` feature is enabled.
//!
//! Names follow the [OpenTelemetry naming guidelines](https://opentelemetry.io/docs/specs/semconv/general/naming/#general-naming-considerations).

pub(crate) mod metrics;

/// Key used to annotate the name of the breaker that emitted an event.
///
/// The value is the name given to [`BreakerBuilder::name`][crate::breaker::BreakerBuilder::name].
/// Prefer short `snake_case` names of the protected dependency, e.g. `inventory_db`.
pub const STRATEGY_NAME: &str = "resilience.strategy.name";

/// Key used to annotate the specific event being emitted.
///
/// Values: `circuit_opened`, `circuit_half_opened`, `circuit_closed`, `circuit_rejected`.
pub const EVENT_NAME: &str = "resilience.event.name";

/// Key used to annotate the state of the breaker after the event.
///
/// Values: `closed`, `half_open`, `open`.
pub const CIRCUIT_STATE: &str = "resilience.circuit_breaker.state";

/// Key used to annotate why a call was rejected.
///
/// Values: `open`, `too_many_requests`.
pub const CIRCUIT_REJECTION: &str = "resilience.circuit_breaker.rejection";

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable() {
        assert_eq!(STRATEGY_NAME, "resilience.strategy.name");
        assert_eq!(EVENT_NAME, "resilience.event.name");
        assert_eq!(CIRCUIT_STATE, "resilience.circuit_breaker.state");
        assert_eq!(CIRCUIT_REJECTION, "resilience.circuit_breaker.rejection");
    }
}
