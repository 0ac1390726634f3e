// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A circuit breaker that stops calling a failing dependency and probes it once it may have
//! recovered.
//!
//! The primary types are:
//!
//! - [`Breaker`] gates calls and tracks their outcomes. It is cheap to clone; clones share state.
//! - [`BreakerBuilder`] configures a breaker before it is built.
//! - [`Fuse`] decides when the breaker opens, based on the [`Counter`] of the current window.
//! - [`BreakerError`] separates calls rejected by the breaker from calls that ran and failed.
//!
//! # Quick Start
//!
//! ```rust
//! # use std::time::Duration;
//! # use tick::Clock;
//! use tripwire::breaker::{Breaker, BreakerError, Fuse, Rejected};
//!
//! # fn example(clock: Clock) {
//! let breaker = Breaker::builder(Fuse::threshold(5), &clock)
//!     .cooldown(Duration::from_secs(30))
//!     .probe_limit(2)
//!     .name("payments_api")
//!     .build();
//!
//! let result = breaker.run(|| charge_card(1999));
//!
//! if let Err(BreakerError::Rejected(Rejected::Open)) = result {
//!     // Fail fast without touching the payments API.
//! }
//! # }
//! # fn charge_card(_cents: u64) -> Result<(), std::io::Error> { Ok(()) }
//! ```
//!
//! # States and Transitions
//!
//! ```text
//! ┌────────┐          fuse trips          ┌──────────┐
//! │ Closed │ ────────────────────────────▶│   Open   │
//! └────────┘                              └──────────┘
//!      ▲                                    ▲      │
//!      │ probe_limit                  probe │      │ cooldown
//!      │ consecutive                failure │      │ elapsed
//!      │ successes                          │      ▼
//!      │                              ┌────────────────┐
//!      └──────────────────────────────│   Half-Open    │
//!                                     └────────────────┘
//! ```
//!
//! - **Closed**: every call runs. Successes and failures are counted. After each failure the
//!   [`Fuse`] is consulted and, if it trips, the breaker opens.
//! - **Open**: every call is rejected with [`Rejected::Open`] until the cooldown has elapsed.
//! - **Half-Open**: at most `probe_limit` calls run. Further calls are rejected with
//!   [`Rejected::TooManyRequests`]. A single failed probe reopens the breaker; `probe_limit`
//!   consecutive successful probes close it.
//!
//! Every transition starts a fresh window: the [`Counter`] is reset to zero.
//!
//! There is no timer. The move from open to half-open happens the next time the breaker is
//! consulted after the cooldown, whether by a call or by [`Breaker::state`].
//!
//! # Failures
//!
//! A call counts as a failure when the operation returns `Err`. A call also counts as a failure
//! when the operation panics (the panic keeps propagating to the caller) or, for
//! [`Breaker::run_async`], when the future is dropped before it completes. An admitted call
//! therefore always returns its slot, and a half-open breaker can never be stuck with every probe
//! slot taken.
//!
//! Outcomes that arrive after the window they were admitted in has ended are still applied to the
//! current state, except while the breaker is open, where they are ignored.
//!
//! # Defaults
//!
//! | Parameter | Default Value | Configured By |
//! |-----------|---------------|---------------|
//! | Cooldown | `10` seconds | [`cooldown`][BreakerBuilder::cooldown] |
//! | Probe limit | `1` | [`probe_limit`][BreakerBuilder::probe_limit] |
//! | Name | `default` | [`name`][BreakerBuilder::name] |
//!
//! # Telemetry
//!
//! ## Metrics
//!
//! - **Metric**: `resilience.event` (counter)
//! - **When**: Emitted on every state transition and on every rejected call
//! - **Attributes**:
//!   - `resilience.strategy.name`: The breaker name
//!   - `resilience.event.name`: One of `circuit_opened`, `circuit_half_opened`,
//!     `circuit_closed` or `circuit_rejected`
//!   - `resilience.circuit_breaker.state`: The state entered, or the state that rejected the call
//!   - `resilience.circuit_breaker.rejection`: `open` or `too_many_requests` (rejections only)
//!
//! ## Logs
//!
//! When enabled with [`enable_logs`][BreakerBuilder::enable_logs], `tracing` events named
//! `tripwire.breaker.opened`, `tripwire.breaker.half_opened`, `tripwire.breaker.closed`,
//! `tripwire.breaker.rejected` and `tripwire.breaker.abandoned` are emitted.

mod builder;
mod circuit;
#[cfg(any(feature = "serde", test))]
mod config;
mod constants;
mod counter;
mod engine;
mod error;
mod fuse;
#[cfg(any(feature = "tower-service", test))]
mod layer;
mod state;
mod telemetry;

pub use builder::BreakerBuilder;
pub use circuit::Breaker;
#[cfg(any(feature = "serde", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use config::{BreakerConfig, FuseConfig};
pub use counter::Counter;
pub use error::{BreakerError, Rejected};
pub use fuse::Fuse;
#[cfg(any(feature = "tower-service", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "tower-service")))]
pub use layer::{BreakerFuture, BreakerLayer, BreakerService};
pub use state::State;
