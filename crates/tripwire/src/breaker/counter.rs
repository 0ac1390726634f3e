// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Outcome statistics of a breaker since its last state change.
///
/// The breaker resets its counter on every state transition, so the values describe the
/// current window only and must not be used as lifetime totals.
///
/// `requests` is incremented when a call is admitted, before its outcome is known. Once every
/// admitted call has completed, `successes + failures == requests`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    /// Number of calls admitted.
    pub requests: u64,
    /// Number of calls that succeeded.
    pub successes: u64,
    /// Number of calls that failed.
    pub failures: u64,
    /// Length of the current run of successes.
    pub consecutive_successes: u64,
    /// Length of the current run of failures.
    pub consecutive_failures: u64,
}

impl Counter {
    pub(crate) fn request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    pub(crate) fn success(&mut self) {
        self.successes = self.successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    pub(crate) fn failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_breaks_failure_run() {
        let mut counter = Counter::default();
        counter.request();
        counter.failure();
        counter.request();
        counter.failure();
        counter.request();
        counter.success();

        assert_eq!(
            counter,
            Counter {
                requests: 3,
                successes: 1,
                failures: 2,
                consecutive_successes: 1,
                consecutive_failures: 0,
            }
        );
    }

    #[test]
    fn failure_breaks_success_run() {
        let mut counter = Counter::default();
        counter.success();
        counter.success();
        counter.failure();

        assert_eq!(counter.consecutive_successes, 0);
        assert_eq!(counter.consecutive_failures, 1);
        assert_eq!(counter.successes, 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut counter = Counter {
            requests: 5,
            successes: 2,
            failures: 3,
            consecutive_successes: 0,
            consecutive_failures: 3,
        };

        counter.reset();

        assert_eq!(counter, Counter::default());
    }

    #[test]
    fn request_saturates() {
        let mut counter = Counter {
            requests: u64::MAX,
            ..Counter::default()
        };

        counter.request();

        assert_eq!(counter.requests, u64::MAX);
    }
}
