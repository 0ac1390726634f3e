// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tick::Clock;

use super::{Counter, Fuse, Rejected, State};

/// Outcome of a single admitted execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() { Self::Success } else { Self::Failure }
    }
}

/// A state change performed by the engine.
///
/// `counter` is the window as it was right before the reset that accompanies every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub from: State,
    pub to: State,
    pub counter: Counter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Entered {
    pub admission: Result<(), Rejected>,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Exited {
    /// The lazy open to half-open move performed before the outcome was applied.
    pub resolved: Option<Transition>,
    /// The move caused by the outcome itself.
    pub transition: Option<Transition>,
}

impl Exited {
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.resolved.iter().chain(self.transition.iter())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EngineOptions {
    pub fuse: Fuse,
    pub cooldown: Duration,
    pub probe_limit: u64,
}

/// Owns the state of the breaker.
///
/// Every method takes the lock for a bounded amount of bookkeeping and releases it before
/// returning; the guarded operation never runs under the lock.
#[derive(Debug)]
pub(crate) struct EngineCore {
    inner: Mutex<Inner>,
    options: EngineOptions,
    clock: Clock,
}

impl EngineCore {
    pub fn new(options: EngineOptions, clock: Clock) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            options,
            clock,
        }
    }

    /// Decides whether a call may proceed and counts it as a request if so.
    pub fn enter(&self) -> Entered {
        // NOTE: Read the clock before taking the lock.
        let now = self.clock.instant();
        self.inner.lock().enter(now, &self.options)
    }

    /// Records the outcome of a previously admitted call.
    pub fn exit(&self, outcome: Outcome) -> Exited {
        let now = self.clock.instant();
        self.inner.lock().exit(outcome, now, &self.options)
    }

    /// Returns the current state, moving from open to half-open if the cooldown has elapsed.
    pub fn state(&self) -> (State, Option<Transition>) {
        let now = self.clock.instant();
        let mut inner = self.inner.lock();
        let transition = inner.resolve(now, &self.options);
        (inner.state, transition)
    }

    pub fn counter(&self) -> Counter {
        self.inner.lock().counter
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: State,
    counter: Counter,
    // Set while open; the cooldown is measured from it.
    opened_at: Option<Instant>,
}

impl Inner {
    fn enter(&mut self, now: Instant, options: &EngineOptions) -> Entered {
        let transition = self.resolve(now, options);

        let admission = match self.state {
            State::Open => Err(Rejected::Open),
            State::HalfOpen if self.counter.requests >= options.probe_limit => Err(Rejected::TooManyRequests),
            State::Closed | State::HalfOpen => {
                self.counter.request();
                Ok(())
            }
        };

        Entered { admission, transition }
    }

    fn exit(&mut self, outcome: Outcome, now: Instant, options: &EngineOptions) -> Exited {
        // The cooldown may have elapsed while the call was running.
        let resolved = self.resolve(now, options);

        let transition = match (self.state, outcome) {
            (State::Closed, Outcome::Success) => {
                self.counter.success();
                None
            }
            (State::Closed, Outcome::Failure) => {
                self.counter.failure();
                options
                    .fuse
                    .trip(&self.counter)
                    .then(|| self.transition_to(State::Open, now))
            }
            (State::HalfOpen, Outcome::Success) => {
                self.counter.success();
                (self.counter.consecutive_successes >= options.probe_limit).then(|| self.transition_to(State::Closed, now))
            }
            (State::HalfOpen, Outcome::Failure) => Some(self.transition_to(State::Open, now)),
            // The window this call belonged to is gone; the outcome is dropped.
            (State::Open, _) => None,
        };

        Exited { resolved, transition }
    }

    /// Performs the lazy open to half-open transition.
    fn resolve(&mut self, now: Instant, options: &EngineOptions) -> Option<Transition> {
        match (self.state, self.opened_at) {
            (State::Open, Some(opened_at)) if now.saturating_duration_since(opened_at) >= options.cooldown => {
                Some(self.transition_to(State::HalfOpen, now))
            }
            _ => None,
        }
    }

    fn transition_to(&mut self, state: State, now: Instant) -> Transition {
        let transition = Transition {
            from: self.state,
            to: state,
            counter: self.counter,
        };

        self.state = state;
        self.opened_at = (state == State::Open).then_some(now);
        self.counter.reset();

        transition
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tick::ClockControl;

    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(5);

    fn options(fuse: Fuse, probe_limit: u64) -> EngineOptions {
        EngineOptions {
            fuse,
            cooldown: COOLDOWN,
            probe_limit,
        }
    }

    fn create_engine(fuse: Fuse, probe_limit: u64) -> (ClockControl, EngineCore) {
        let control = ClockControl::new();
        let engine = EngineCore::new(options(fuse, probe_limit), control.to_clock());
        (control, engine)
    }

    fn call(engine: &EngineCore, outcome: Outcome) -> Option<Transition> {
        assert_eq!(engine.enter().admission, Ok(()));
        engine.exit(outcome).transition
    }

    fn open(engine: &EngineCore) {
        for _ in 0..1000 {
            if call(engine, Outcome::Failure).is_some_and(|t| t.to == State::Open) {
                return;
            }
        }

        panic!("failed to open the breaker");
    }

    #[test]
    fn new_engine_is_closed() {
        let (_, engine) = create_engine(Fuse::threshold(1), 1);

        assert_eq!(engine.state(), (State::Closed, None));
        assert_eq!(engine.counter(), Counter::default());
    }

    #[test]
    fn successes_keep_closed() {
        let (_, engine) = create_engine(Fuse::threshold(0), 1);

        for expected in 1..=10 {
            assert_eq!(call(&engine, Outcome::Success), None);
            assert_eq!(engine.counter().consecutive_successes, expected);
            assert_eq!(engine.counter().consecutive_failures, 0);
        }

        assert_eq!(engine.state().0, State::Closed);
    }

    #[test]
    fn threshold_opens_after_count_plus_one_failures() {
        let (_, engine) = create_engine(Fuse::threshold(3), 1);

        for _ in 0..3 {
            assert_eq!(call(&engine, Outcome::Failure), None);
        }

        let transition = call(&engine, Outcome::Failure).unwrap();

        assert_eq!(transition.from, State::Closed);
        assert_eq!(transition.to, State::Open);
        assert_eq!(transition.counter.failures, 4);
        assert_eq!(engine.counter(), Counter::default());
        assert_eq!(engine.state().0, State::Open);
    }

    #[test]
    fn consecutive_fuse_is_delayed_by_success() {
        let (_, engine) = create_engine(Fuse::consecutive(1), 1);

        call(&engine, Outcome::Failure);
        call(&engine, Outcome::Success);
        assert_eq!(call(&engine, Outcome::Failure), None);
        assert_eq!(engine.state().0, State::Closed);

        assert!(call(&engine, Outcome::Failure).is_some());
        assert_eq!(engine.state().0, State::Open);
    }

    #[test]
    fn open_rejects_until_cooldown_elapses() {
        let (control, engine) = create_engine(Fuse::threshold(0), 1);
        open(&engine);

        assert_eq!(engine.enter().admission, Err(Rejected::Open));

        control.advance(COOLDOWN - Duration::from_millis(1));
        assert_eq!(engine.state().0, State::Open);
        assert_eq!(engine.enter().admission, Err(Rejected::Open));

        control.advance(Duration::from_millis(1));
        let (state, transition) = engine.state();
        assert_eq!(state, State::HalfOpen);
        assert_eq!(transition.map(|t| (t.from, t.to)), Some((State::Open, State::HalfOpen)));
    }

    #[test]
    fn maximal_cooldown_keeps_engine_open() {
        let control = ClockControl::new();
        let options = EngineOptions {
            cooldown: Duration::MAX,
            ..options(Fuse::threshold(0), 1)
        };
        let engine = EngineCore::new(options, control.to_clock());

        let transition = call(&engine, Outcome::Failure);
        assert_eq!(transition.map(|t| t.to), Some(State::Open));
        assert_eq!(engine.counter(), Counter::default());

        control.advance(Duration::from_secs(365 * 24 * 60 * 60));
        assert_eq!(engine.state(), (State::Open, None));
        assert_eq!(engine.enter().admission, Err(Rejected::Open));
    }

    #[test]
    fn enter_performs_lazy_transition() {
        let (control, engine) = create_engine(Fuse::threshold(0), 1);
        open(&engine);
        control.advance(COOLDOWN);

        let entered = engine.enter();

        assert_eq!(entered.admission, Ok(()));
        assert_eq!(entered.transition.map(|t| t.to), Some(State::HalfOpen));
        assert_eq!(engine.counter().requests, 1);
    }

    #[test]
    fn half_open_limits_probes() {
        let (control, engine) = create_engine(Fuse::threshold(0), 2);
        open(&engine);
        control.advance(COOLDOWN);

        assert_eq!(engine.enter().admission, Ok(()));
        assert_eq!(engine.enter().admission, Ok(()));
        assert_eq!(engine.enter().admission, Err(Rejected::TooManyRequests));
        assert_eq!(engine.state().0, State::HalfOpen);
    }

    #[test]
    fn half_open_failure_reopens() {
        let (control, engine) = create_engine(Fuse::threshold(0), 3);
        open(&engine);
        control.advance(COOLDOWN);

        call(&engine, Outcome::Success);
        let transition = call(&engine, Outcome::Failure).unwrap();

        assert_eq!((transition.from, transition.to), (State::HalfOpen, State::Open));
        assert_eq!(engine.counter(), Counter::default());
        assert_eq!(engine.enter().admission, Err(Rejected::Open));

        // The cooldown starts over from the failed probe.
        control.advance(COOLDOWN - Duration::from_millis(1));
        assert_eq!(engine.state().0, State::Open);
        control.advance(Duration::from_millis(1));
        assert_eq!(engine.state().0, State::HalfOpen);
    }

    #[test]
    fn half_open_closes_after_probe_limit_successes() {
        let (control, engine) = create_engine(Fuse::threshold(0), 2);
        open(&engine);
        control.advance(COOLDOWN);

        assert_eq!(call(&engine, Outcome::Success), None);
        assert_eq!(engine.state().0, State::HalfOpen);

        let transition = call(&engine, Outcome::Success).unwrap();

        assert_eq!((transition.from, transition.to), (State::HalfOpen, State::Closed));
        assert_eq!(transition.counter.consecutive_successes, 2);
        assert_eq!(engine.counter(), Counter::default());
        assert_eq!(engine.state().0, State::Closed);
    }

    #[test]
    fn outcome_while_open_is_dropped() {
        let (_, engine) = create_engine(Fuse::threshold(0), 1);

        // Two calls are admitted while closed; the first failure opens the breaker.
        assert_eq!(engine.enter().admission, Ok(()));
        assert_eq!(engine.enter().admission, Ok(()));
        assert!(engine.exit(Outcome::Failure).transition.is_some());

        assert_eq!(
            engine.exit(Outcome::Success),
            Exited {
                resolved: None,
                transition: None
            }
        );
        assert_eq!(engine.state().0, State::Open);
        assert_eq!(engine.counter(), Counter::default());
    }

    #[test]
    fn exit_after_cooldown_counts_towards_half_open() {
        let (control, engine) = create_engine(Fuse::threshold(0), 1);

        assert_eq!(engine.enter().admission, Ok(()));
        assert_eq!(engine.enter().admission, Ok(()));
        engine.exit(Outcome::Failure);
        control.advance(COOLDOWN);

        let exited = engine.exit(Outcome::Success);
        let moves: Vec<_> = exited.transitions().map(|t| (t.from, t.to)).collect();

        assert_eq!(moves, [(State::Open, State::HalfOpen), (State::HalfOpen, State::Closed)]);
    }

    #[test]
    fn rate_fuse_uses_window_totals() {
        let (_, engine) = create_engine(Fuse::rate(50), 1);

        call(&engine, Outcome::Success);
        assert_eq!(call(&engine, Outcome::Failure), None);
        assert_eq!(call(&engine, Outcome::Failure), None);
        assert_eq!(engine.state().0, State::Closed);

        let (_, engine) = create_engine(Fuse::rate(50), 1);
        assert!(call(&engine, Outcome::Failure).is_some());
    }

    #[test]
    fn outcome_from_result() {
        assert_eq!(Outcome::from_result(&Ok::<_, ()>(1)), Outcome::Success);
        assert_eq!(Outcome::from_result(&Err::<(), _>("boom")), Outcome::Failure);
    }
}
