// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(all(
        feature = "breaker",
        feature = "retry",
        feature = "metrics",
        feature = "logs",
        feature = "tower-service",
        feature = "serde"
    )),
    expect(
        rustdoc::broken_intra_doc_links,
        reason = "too ugly to make 'live links' possible with the combination of features"
    )
)]

//! Circuit breaking and retrying for calls to fallible dependencies.
//!
//! A service that talks to a database, a cache or another service needs to stop hammering that
//! dependency once it is clearly failing, and to find out on its own when it has recovered. This
//! crate provides the two small building blocks for that:
//!
//! - [`breaker`]: a circuit breaker that gates calls through a three-state machine
//!   (closed, open, half-open) driven by a pluggable trip policy ([`Fuse`][breaker::Fuse]).
//! - [`retry`]: a retry helper that re-runs an operation according to a delay [`Policy`][retry::Policy].
//!
//! The two are independent. The breaker never retries on its own; wrap one in
//! the other in whichever order suits the call site.
//!
//! # Quick Start
//!
//! ```rust
//! # #[cfg(feature = "breaker")]
//! # {
//! # use std::time::Duration;
//! # use tick::Clock;
//! use tripwire::breaker::{Breaker, BreakerError, Fuse, State};
//!
//! # fn example(clock: Clock) {
//! let breaker = Breaker::builder(Fuse::consecutive(3), &clock)
//!     .cooldown(Duration::from_secs(5))
//!     .build();
//!
//! match breaker.run(|| query_inventory("sku-42")) {
//!     Ok(count) => println!("{count} items left"),
//!     Err(BreakerError::Rejected(rejected)) => println!("not calling inventory: {rejected}"),
//!     Err(BreakerError::Inner(err)) => println!("inventory failed: {err}"),
//! }
//!
//! assert_eq!(breaker.state(), State::Closed);
//! # }
//! # fn query_inventory(_sku: &str) -> Result<u32, std::io::Error> { Ok(3) }
//! # }
//! ```
//!
//! > **Note**: Time is read from a [`Clock`][tick::Clock] from the [`tick`] crate. The breaker never
//! > spawns timers; the cooldown is checked whenever the breaker is consulted.
//!
//! # Recovery Metadata
//!
//! Errors produced by this crate implement [`Recovery`] so that layered policies can classify
//! them uniformly. A rejection by an open breaker reports [`RecoveryKind::Unavailable`].
//!
//! ## Features
//!
//! - `breaker`: Enables the [`breaker`] module.
//! - `retry`: Enables the [`retry`] module.
//! - `metrics`: Reports breaker events through OpenTelemetry metrics.
//! - `logs`: Emits structured `tracing` events for breaker transitions, rejections and retries.
//! - `tower-service`: Provides a tower middleware that guards an inner service with a breaker.
//! - `serde`: Enables serializable breaker configuration.

#[doc(inline)]
pub use recoverable::{Recovery, RecoveryInfo, RecoveryKind};

#[cfg(any(feature = "breaker", test))]
pub mod breaker;

#[cfg(any(feature = "retry", test))]
pub mod retry;

#[cfg(any(all(feature = "metrics", feature = "breaker"), test))]
pub mod telemetry;

#[cfg(any(feature = "breaker", test))]
mod utils;
