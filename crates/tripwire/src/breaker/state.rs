// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};

/// The state of a [`Breaker`][super::Breaker].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Calls pass through and their outcomes feed the trip policy.
    #[default]
    Closed,

    /// A limited number of probe calls are let through to find out whether the
    /// protected dependency has recovered.
    HalfOpen,

    /// Calls are rejected without being executed until the cooldown elapses.
    Open,
}

impl State {
    /// Returns the `snake_case` name of the state, as reported in telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::HalfOpen => "half_open",
            Self::Open => "open",
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
