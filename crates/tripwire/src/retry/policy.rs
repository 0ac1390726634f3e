// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Decides whether, and after how long, a failed operation is executed again.
///
/// A policy is stateful and is consumed by a single [`run`][super::run].
pub trait Policy {
    /// Returns the delay before the next execution, or `None` to stop retrying.
    ///
    /// Once a policy has returned `None` it keeps returning `None`.
    fn next_delay(&mut self) -> Option<Duration>;
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn next_delay(&mut self) -> Option<Duration> {
        (**self).next_delay()
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn next_delay(&mut self) -> Option<Duration> {
        (**self).next_delay()
    }
}

/// Doubles the delay after every retry.
///
/// `attempts` is the total number of executions, so the policy yields `attempts - 1` delays:
/// `base_delay`, `2 * base_delay`, `4 * base_delay`, and so on.
///
/// ```rust
/// # use std::time::Duration;
/// use tripwire::retry::{ExponentialPolicy, Policy};
///
/// let mut policy = ExponentialPolicy::new(3, Duration::from_millis(1));
///
/// assert_eq!(policy.next_delay(), Some(Duration::from_millis(1)));
/// assert_eq!(policy.next_delay(), Some(Duration::from_millis(2)));
/// assert_eq!(policy.next_delay(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialPolicy {
    retries_left: u32,
    delay: Duration,
    max_delay: Option<Duration>,
}

impl ExponentialPolicy {
    /// Creates a policy that allows `attempts` executions in total, starting with `base_delay`.
    ///
    /// `0` and `1` both mean a single execution without retries.
    #[must_use]
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            retries_left: attempts.saturating_sub(1),
            delay: base_delay,
            max_delay: None,
        }
    }

    /// Caps every delay at `max_delay`.
    #[must_use]
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }
}

impl Policy for ExponentialPolicy {
    fn next_delay(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }

        self.retries_left -= 1;

        let delay = self.max_delay.map_or(self.delay, |max| self.delay.min(max));
        self.delay = self.delay.saturating_mul(2);

        Some(delay)
    }
}
