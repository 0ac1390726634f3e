// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use recoverable::{Recovery, RecoveryInfo};

/// The reason a [`Breaker`][super::Breaker] refused to execute a call.
///
/// Rejections are produced by the breaker itself, before the operation runs. They are never
/// produced by the guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Rejected {
    /// The breaker is open.
    #[error("circuit breaker is open")]
    Open,

    /// The breaker is half-open and every probe slot is taken.
    #[error("circuit breaker is half-open and has no probe slots left")]
    TooManyRequests,
}

impl Rejected {
    /// Returns the `snake_case` name of the rejection, as reported in telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::TooManyRequests => "too_many_requests",
        }
    }
}

impl Recovery for Rejected {
    fn recovery(&self) -> RecoveryInfo {
        RecoveryInfo::unavailable()
    }
}

/// The error returned by a call made through a [`Breaker`][super::Breaker].
///
/// Callers distinguish "the breaker refused the call" ([`BreakerError::Rejected`]) from "the
/// call ran and failed" ([`BreakerError::Inner`]). The operation's error is carried unchanged.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BreakerError<E> {
    /// The call was not executed.
    #[error(transparent)]
    Rejected(#[from] Rejected),

    /// The call was executed and returned this error.
    #[error(transparent)]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// Returns the error of the operation, or `None` when the call was rejected.
    #[must_use]
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Rejected(_) => None,
            Self::Inner(err) => Some(err),
        }
    }

    /// Returns the rejection reason, or `None` when the call was executed.
    #[must_use]
    pub fn rejected(&self) -> Option<Rejected> {
        match self {
            Self::Rejected(rejected) => Some(*rejected),
            Self::Inner(_) => None,
        }
    }

    /// Returns `true` if the breaker refused the call.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl<E: Recovery> Recovery for BreakerError<E> {
    fn recovery(&self) -> RecoveryInfo {
        match self {
            Self::Rejected(rejected) => rejected.recovery(),
            Self::Inner(err) => err.recovery(),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::io;

    use recoverable::RecoveryKind;

    use super::*;

    static_assertions::assert_impl_all!(Rejected: Send, Sync, std::error::Error);
    static_assertions::assert_impl_all!(BreakerError<io::Error>: Send, Sync, std::error::Error);

    #[derive(Debug)]
    struct Transient;

    impl Recovery for Transient {
        fn recovery(&self) -> RecoveryInfo {
            RecoveryInfo::retry()
        }
    }

    #[test]
    fn rejected_display() {
        assert_eq!(Rejected::Open.to_string(), "circuit breaker is open");
        assert_eq!(
            Rejected::TooManyRequests.to_string(),
            "circuit breaker is half-open and has no probe slots left"
        );
    }

    #[test]
    fn rejected_as_str() {
        assert_eq!(Rejected::Open.as_str(), "open");
        assert_eq!(Rejected::TooManyRequests.as_str(), "too_many_requests");
    }

    #[test]
    fn inner_is_transparent() {
        let err: BreakerError<io::Error> = BreakerError::Inner(io::Error::other("connection reset"));

        assert_eq!(err.to_string(), "connection reset");
        assert!(!err.is_rejected());
        assert_eq!(err.rejected(), None);
        assert_eq!(err.into_inner().map(|e| e.to_string()).as_deref(), Some("connection reset"));
    }

    #[test]
    fn rejection_converts_from() {
        let err: BreakerError<String> = Rejected::Open.into();

        assert!(err.is_rejected());
        assert_eq!(err.rejected(), Some(Rejected::Open));
        assert_eq!(err.to_string(), "circuit breaker is open");
        assert_eq!(err.into_inner(), None);
    }

    #[test]
    fn recovery_classification() {
        let rejected: BreakerError<Transient> = BreakerError::Rejected(Rejected::TooManyRequests);
        let inner: BreakerError<Transient> = BreakerError::Inner(Transient);

        assert_eq!(rejected.recovery().kind(), RecoveryKind::Unavailable);
        assert_eq!(inner.recovery().kind(), RecoveryKind::Retry);
    }
}
