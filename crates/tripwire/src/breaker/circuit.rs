// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::ops::Deref;
use std::sync::Arc;

use tick::Clock;

use super::engine::{EngineCore, EngineOptions, Outcome};
use super::telemetry::BreakerTelemetry;
use super::{BreakerBuilder, BreakerError, Counter, Fuse, Rejected, State};

/// A circuit breaker.
///
/// Calls made through [`run`][Breaker::run] or [`run_async`][Breaker::run_async] are admitted
/// or rejected according to the current [`State`], and their outcomes drive the transitions
/// between states. See the [module documentation][super] for the state machine.
///
/// Cloning a `Breaker` is cheap and the clones share their state, so a single breaker can guard
/// a dependency from many threads or tasks.
///
/// # Examples
///
/// ```rust
/// # use std::time::Duration;
/// # use tick::ClockControl;
/// use tripwire::breaker::{Breaker, BreakerError, Fuse, Rejected, State};
///
/// let control = ClockControl::new();
/// let breaker = Breaker::builder(Fuse::threshold(0), &control.to_clock())
///     .cooldown(Duration::from_secs(1))
///     .build();
///
/// let result: Result<(), _> = breaker.run(|| Err("timeout"));
/// assert_eq!(result, Err(BreakerError::Inner("timeout")));
/// assert_eq!(breaker.state(), State::Open);
///
/// let result = breaker.run(|| Ok::<_, &str>(()));
/// assert_eq!(result, Err(BreakerError::Rejected(Rejected::Open)));
///
/// control.advance(Duration::from_secs(1));
/// assert_eq!(breaker.state(), State::HalfOpen);
/// ```
#[derive(Debug, Clone)]
pub struct Breaker {
    shared: Arc<Shared>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    engine: EngineCore,
    telemetry: BreakerTelemetry,
}

impl Breaker {
    /// Creates a breaker with the given fuse and default settings.
    #[must_use]
    pub fn new(fuse: Fuse, clock: &Clock) -> Self {
        Self::builder(fuse, clock).build()
    }

    /// Starts configuring a breaker with the given fuse.
    ///
    /// The clock is used to measure the cooldown. Pass a clock driven by
    /// [`ClockControl`][tick::ClockControl] to control time in tests.
    #[must_use]
    pub fn builder(fuse: Fuse, clock: &Clock) -> BreakerBuilder {
        BreakerBuilder::new(fuse, clock)
    }

    pub(crate) fn from_parts(options: EngineOptions, clock: Clock, telemetry: BreakerTelemetry) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine: EngineCore::new(options, clock),
                telemetry,
            }),
        }
    }

    /// Runs `operation` if the breaker admits it, and records its outcome.
    ///
    /// `Ok` counts as a success and `Err` as a failure. If the operation panics, a failure is
    /// recorded and the panic resumes.
    ///
    /// # Errors
    ///
    /// Returns [`BreakerError::Rejected`] without calling `operation` when the breaker is open
    /// or out of probe slots, and [`BreakerError::Inner`] with the operation's error otherwise.
    pub fn run<T, E>(&self, operation: impl FnOnce() -> Result<T, E>) -> Result<T, BreakerError<E>> {
        let permit = admit(&*self.shared)?;
        let result = operation();
        permit.complete(Outcome::from_result(&result));

        result.map_err(BreakerError::Inner)
    }

    /// Runs the future returned by `operation` if the breaker admits it, and records its outcome.
    ///
    /// Behaves like [`run`][Breaker::run]. In addition, dropping the returned future after the
    /// call was admitted but before it completed records a failure.
    ///
    /// # Errors
    ///
    /// Returns [`BreakerError::Rejected`] without calling `operation` when the breaker is open
    /// or out of probe slots, and [`BreakerError::Inner`] with the operation's error otherwise.
    pub async fn run_async<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = admit(&*self.shared)?;
        let result = operation().await;
        permit.complete(Outcome::from_result(&result));

        result.map_err(BreakerError::Inner)
    }

    /// Returns the current state.
    ///
    /// Moves the breaker from open to half-open when the cooldown has elapsed.
    #[must_use]
    pub fn state(&self) -> State {
        let (state, transition) = self.shared.engine.state();

        if let Some(transition) = transition {
            self.shared.telemetry.report_transition(&transition);
        }

        state
    }

    /// Returns a snapshot of the counter of the current window.
    #[must_use]
    pub fn counter(&self) -> Counter {
        self.shared.engine.counter()
    }

    /// Returns the name reported in telemetry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.telemetry.name
    }

    /// Admits a call whose outcome is reported from a `'static` future.
    #[cfg(any(feature = "tower-service", test))]
    pub(crate) fn admit_owned(&self) -> Result<Permit<Arc<Shared>>, Rejected> {
        admit(Arc::clone(&self.shared))
    }
}

fn admit<R: Deref<Target = Shared>>(shared: R) -> Result<Permit<R>, Rejected> {
    let entered = shared.engine.enter();

    if let Some(transition) = entered.transition {
        shared.telemetry.report_transition(&transition);
    }

    match entered.admission {
        Ok(()) => Ok(Permit { shared, done: false }),
        Err(rejected) => {
            let state = match rejected {
                Rejected::Open => State::Open,
                Rejected::TooManyRequests => State::HalfOpen,
            };

            shared.telemetry.report_rejection(rejected, state);
            Err(rejected)
        }
    }
}

impl Shared {
    fn exit(&self, outcome: Outcome) {
        let exited = self.engine.exit(outcome);

        for transition in exited.transitions() {
            self.telemetry.report_transition(transition);
        }
    }
}

/// An admitted call that has not reported its outcome yet.
///
/// Dropping it without calling [`complete`][Permit::complete] records a failure. This covers
/// operations that panic and futures that are dropped mid-flight.
#[derive(Debug)]
pub(crate) struct Permit<R: Deref<Target = Shared>> {
    shared: R,
    done: bool,
}

impl<R: Deref<Target = Shared>> Permit<R> {
    pub(crate) fn complete(mut self, outcome: Outcome) {
        self.done = true;
        self.shared.exit(outcome);
    }
}

impl<R: Deref<Target = Shared>> Drop for Permit<R> {
    fn drop(&mut self) {
        if !self.done {
            self.shared.telemetry.report_abandoned(std::thread::panicking());
            self.shared.exit(Outcome::Failure);
        }
    }
}
