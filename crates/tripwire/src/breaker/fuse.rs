// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::Counter;
use super::constants::MAX_RATE_PERCENT;
use crate::utils::define_fn_wrapper;

define_fn_wrapper!(TripFn(Fn(counter: &Counter) -> bool));

/// The trip policy of a [`Breaker`][super::Breaker].
///
/// A fuse is consulted only while the breaker is closed, right after a failure has been
/// recorded. When [`trip`][Fuse::trip] returns `true`, the breaker opens.
///
/// The built-in fuses compare the [`Counter`] of the current window against a limit:
///
/// | Fuse | Trips when |
/// |------|------------|
/// | [`Fuse::threshold(n)`][Fuse::threshold] | `failures > n` |
/// | [`Fuse::consecutive(n)`][Fuse::consecutive] | `consecutive_failures > n` |
/// | [`Fuse::rate(p)`][Fuse::rate] | `failures / requests * 100 > p`, in integer arithmetic |
///
/// Custom policies can be provided with [`Fuse::new`].
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "breaker")]
/// # {
/// use tripwire::breaker::{Counter, Fuse};
///
/// let fuse = Fuse::new(|counter: &Counter| counter.failures > 2 && counter.consecutive_failures > 1);
///
/// assert!(!fuse.trip(&Counter { failures: 3, consecutive_failures: 1, ..Counter::default() }));
/// assert!(fuse.trip(&Counter { failures: 3, consecutive_failures: 2, ..Counter::default() }));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fuse(Kind);

#[derive(Debug, Clone)]
enum Kind {
    Threshold(u64),
    Consecutive(u64),
    Rate(u64),
    Custom(TripFn),
}

impl Fuse {
    /// Trips when the number of failures in the current window exceeds `count`.
    #[must_use]
    pub fn threshold(count: u64) -> Self {
        Self(Kind::Threshold(count))
    }

    /// Trips when the number of consecutive failures exceeds `count`.
    ///
    /// A single success resets the run of failures.
    #[must_use]
    pub fn consecutive(count: u64) -> Self {
        Self(Kind::Consecutive(count))
    }

    /// Trips when `failures / requests * 100 > percent` for the current window.
    ///
    /// The division is an integer division, evaluated before scaling. With 10 requests and
    /// `percent` at 10, nine failures do not trip the fuse (`9 / 10 == 0`) while ten do. In
    /// practice the fuse trips once every request of the window has failed and `percent` is
    /// below `100`. A window without requests never trips. Values above `100` are clamped to `100`.
    #[must_use]
    pub fn rate(percent: u64) -> Self {
        Self(Kind::Rate(percent.min(MAX_RATE_PERCENT)))
    }

    /// Creates a fuse from a custom predicate over the counter.
    #[must_use]
    pub fn new(trip: impl Fn(&Counter) -> bool + Send + Sync + 'static) -> Self {
        Self(Kind::Custom(TripFn::new(trip)))
    }

    /// Decides whether the breaker should open given the counter of the current window.
    #[must_use]
    pub fn trip(&self, counter: &Counter) -> bool {
        match &self.0 {
            Kind::Threshold(count) => counter.failures > *count,
            Kind::Consecutive(count) => counter.consecutive_failures > *count,
            Kind::Rate(percent) => counter
                .failures
                .checked_div(counter.requests)
                .is_some_and(|ratio| ratio.saturating_mul(MAX_RATE_PERCENT) > *percent),
            Kind::Custom(trip) => trip.call(counter),
        }
    }
}
