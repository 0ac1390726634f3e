// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use recoverable::{Recovery, RecoveryKind};
use tick::Clock;

use super::Policy;

/// Runs `operation` until it succeeds, fails with a non-recoverable error, or `policy` stops.
///
/// After each failure the error's [`RecoveryKind`] is checked. `Never` returns the error right
/// away; any other kind asks `policy` for the next delay, waits on `clock`, and runs the
/// operation again. When the policy returns `None`, the error of the last execution is returned.
///
/// Delays suggested by the error's [`RecoveryInfo`][crate::RecoveryInfo] are not used; only the
/// policy decides how long to wait.
///
/// # Errors
///
/// Returns the error of the last execution of `operation`.
pub async fn run<T, E, F, Fut>(clock: &Clock, mut policy: impl Policy, mut operation: F) -> Result<T, E>
where
    E: Recovery,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if error.recovery().kind() == RecoveryKind::Never {
            return Err(error);
        }

        let Some(delay) = policy.next_delay() else {
            return Err(error);
        };

        attempt = attempt.saturating_add(1);

        #[cfg(any(feature = "logs", test))]
        tracing::event!(
            name: "tripwire.retry.attempt",
            tracing::Level::DEBUG,
            retry.attempt = attempt,
            retry.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            retry.recovery = %error.recovery().kind(),
        );

        clock.delay(delay).await;
    }
}
