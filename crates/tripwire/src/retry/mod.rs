// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Re-running failed operations according to a delay policy.
//!
//! [`run`] executes an async operation and, while it fails with a recoverable error, waits for
//! the delay produced by a [`Policy`] and executes it again. Errors are classified with
//! [`Recovery`][crate::Recovery]: an error whose kind is [`RecoveryKind::Never`][crate::RecoveryKind::Never]
//! stops the loop immediately, every other error is retried while the policy allows it.
//!
//! # Quick Start
//!
//! ```rust
//! # use std::time::Duration;
//! # use tick::Clock;
//! use tripwire::retry::{self, ExponentialPolicy};
//! # use tripwire::{Recovery, RecoveryInfo};
//! # #[derive(Debug)] struct FetchError;
//! # impl Recovery for FetchError { fn recovery(&self) -> RecoveryInfo { RecoveryInfo::retry() } }
//! # async fn fetch_profile(_id: u64) -> Result<String, FetchError> { Ok(String::new()) }
//!
//! # async fn example(clock: Clock) -> Result<(), FetchError> {
//! // Up to 4 executions, waiting 100ms, 200ms and 400ms in between.
//! let policy = ExponentialPolicy::new(4, Duration::from_millis(100));
//!
//! let profile = retry::run(&clock, policy, || fetch_profile(42)).await?;
//! # let _ = profile;
//! # Ok(())
//! # }
//! ```
//!
//! # Combining with a breaker
//!
//! Rejections by a [`Breaker`][crate::breaker::Breaker] report
//! [`RecoveryKind::Unavailable`][crate::RecoveryKind::Unavailable], so wrapping a breaker call
//! with [`run`] retries through an open breaker once the policy delay has elapsed. Give the
//! operation error a `Never` classification to stop early.
//!
//! # Telemetry
//!
//! With the `logs` feature, a `tripwire.retry.attempt` event is emitted at `DEBUG` level before
//! every retry.

mod policy;
mod run;

pub use policy::{ExponentialPolicy, Policy};
pub use run::run;
