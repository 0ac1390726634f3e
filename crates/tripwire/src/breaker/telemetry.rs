// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use super::engine::Transition;
use super::{Rejected, State};

#[cfg(any(feature = "metrics", test))]
pub(crate) const CIRCUIT_OPENED_EVENT_NAME: &str = "circuit_opened";
#[cfg(any(feature = "metrics", test))]
pub(crate) const CIRCUIT_HALF_OPENED_EVENT_NAME: &str = "circuit_half_opened";
#[cfg(any(feature = "metrics", test))]
pub(crate) const CIRCUIT_CLOSED_EVENT_NAME: &str = "circuit_closed";
#[cfg(any(feature = "metrics", test))]
pub(crate) const CIRCUIT_REJECTED_EVENT_NAME: &str = "circuit_rejected";

/// Reports breaker events to the configured sinks.
///
/// Callers invoke it after the engine lock has been released.
#[derive(Debug, Clone)]
pub(crate) struct BreakerTelemetry {
    pub(crate) name: Cow<'static, str>,
    #[cfg(any(feature = "metrics", test))]
    pub(crate) event_reporter: Option<opentelemetry::metrics::Counter<u64>>,
    #[cfg(any(feature = "logs", test))]
    pub(crate) logs_enabled: bool,
}

impl BreakerTelemetry {
    #[cfg_attr(
        not(any(feature = "metrics", feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "only used when telemetry is enabled")
    )]
    pub fn report_transition(&self, transition: &Transition) {
        #[cfg(any(feature = "metrics", test))]
        self.add_event(event_name(transition.to), transition.to, None);

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            let counter = &transition.counter;
            match transition.to {
                State::Open => tracing::event!(
                    name: "tripwire.breaker.opened",
                    tracing::Level::WARN,
                    breaker.name = %self.name,
                    circuit_breaker.state = State::Open.as_str(),
                    circuit_breaker.previous_state = transition.from.as_str(),
                    circuit_breaker.requests = counter.requests,
                    circuit_breaker.failures = counter.failures,
                    circuit_breaker.consecutive_failures = counter.consecutive_failures,
                ),
                State::HalfOpen => tracing::event!(
                    name: "tripwire.breaker.half_opened",
                    tracing::Level::INFO,
                    breaker.name = %self.name,
                    circuit_breaker.state = State::HalfOpen.as_str(),
                ),
                State::Closed => tracing::event!(
                    name: "tripwire.breaker.closed",
                    tracing::Level::INFO,
                    breaker.name = %self.name,
                    circuit_breaker.state = State::Closed.as_str(),
                    circuit_breaker.probes.successful = counter.successes,
                ),
            }
        }
    }

    #[cfg_attr(
        not(any(feature = "metrics", feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "only used when telemetry is enabled")
    )]
    pub fn report_rejection(&self, rejected: Rejected, state: State) {
        #[cfg(any(feature = "metrics", test))]
        self.add_event(CIRCUIT_REJECTED_EVENT_NAME, state, Some(rejected));

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "tripwire.breaker.rejected",
                tracing::Level::WARN,
                breaker.name = %self.name,
                circuit_breaker.state = state.as_str(),
                circuit_breaker.rejection = rejected.as_str(),
            );
        }
    }

    /// Reports an admitted call that unwound or was dropped before producing a result.
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "only used when logs are enabled")
    )]
    pub fn report_abandoned(&self, panicked: bool) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "tripwire.breaker.abandoned",
                tracing::Level::WARN,
                breaker.name = %self.name,
                circuit_breaker.panicked = panicked,
            );
        }
    }

    #[cfg(any(feature = "metrics", test))]
    fn add_event(&self, event: &'static str, state: State, rejected: Option<Rejected>) {
        use opentelemetry::KeyValue;

        use crate::telemetry::{CIRCUIT_REJECTION, CIRCUIT_STATE, EVENT_NAME, STRATEGY_NAME};

        let Some(reporter) = &self.event_reporter else {
            return;
        };

        let strategy = KeyValue::new(STRATEGY_NAME, self.name.clone());
        let event = KeyValue::new(EVENT_NAME, event);
        let state = KeyValue::new(CIRCUIT_STATE, state.as_str());

        match rejected {
            Some(rejected) => reporter.add(1, &[strategy, event, state, KeyValue::new(CIRCUIT_REJECTION, rejected.as_str())]),
            None => reporter.add(1, &[strategy, event, state]),
        }
    }
}

#[cfg(any(feature = "metrics", test))]
fn event_name(state: State) -> &'static str {
    match state {
        State::Open => CIRCUIT_OPENED_EVENT_NAME,
        State::HalfOpen => CIRCUIT_HALF_OPENED_EVENT_NAME,
        State::Closed => CIRCUIT_CLOSED_EVENT_NAME,
    }
}
