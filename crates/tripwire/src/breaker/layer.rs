// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::engine::Outcome;
use super::{Breaker, BreakerError};

/// A [`tower_layer::Layer`] that guards services with a [`Breaker`].
///
/// Every service produced by the layer shares the same breaker.
///
/// ```rust
/// # use tick::Clock;
/// # use tower_layer::Layer;
/// use tripwire::breaker::{Breaker, BreakerLayer, Fuse};
///
/// # fn example<S>(clock: Clock, inventory: S) {
/// let breaker = Breaker::builder(Fuse::rate(50), &clock).name("inventory_rpc").build();
/// let service = BreakerLayer::new(breaker).layer(inventory);
/// # let _ = service;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BreakerLayer {
    breaker: Breaker,
}

impl BreakerLayer {
    /// Creates a layer that guards services with `breaker`.
    #[must_use]
    pub fn new(breaker: Breaker) -> Self {
        Self { breaker }
    }
}

impl<S> tower_layer::Layer<S> for BreakerLayer {
    type Service = BreakerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BreakerService {
            inner,
            breaker: self.breaker.clone(),
        }
    }
}

/// A [`tower_service::Service`] that runs every call of the inner service through a [`Breaker`].
///
/// Admission is decided when the call is made. A rejected call never reaches the inner service
/// and resolves to [`BreakerError::Rejected`]. An admitted call resolves to the inner response,
/// or to [`BreakerError::Inner`] with the inner error, which is then counted as a failure.
///
/// Readiness is delegated to the inner service. Readiness errors are returned as
/// [`BreakerError::Inner`] and are not counted by the breaker.
#[derive(Debug, Clone)]
pub struct BreakerService<S> {
    inner: S,
    breaker: Breaker,
}

impl<S> BreakerService<S> {
    /// Returns the breaker guarding this service.
    #[must_use]
    pub fn breaker(&self) -> &Breaker {
        &self.breaker
    }

    /// Returns a reference to the inner service.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consumes the middleware and returns the inner service.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// Future returned by [`BreakerService`].
pub struct BreakerFuture<T, E> {
    inner: Pin<Box<dyn Future<Output = Result<T, BreakerError<E>>> + Send>>,
}

impl<T, E> Debug for BreakerFuture<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerFuture").finish_non_exhaustive()
    }
}

impl<T, E> Future for BreakerFuture<T, E> {
    type Output = Result<T, BreakerError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<Req, S> tower_service::Service<Req> for BreakerService<S>
where
    S: tower_service::Service<Req>,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = BreakerError<S::Error>;
    type Future = BreakerFuture<S::Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(BreakerError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let permit = match self.breaker.admit_owned() {
            Ok(permit) => permit,
            Err(rejected) => {
                return BreakerFuture {
                    inner: Box::pin(std::future::ready(Err(rejected.into()))),
                };
            }
        };

        let future = self.inner.call(req);

        BreakerFuture {
            inner: Box::pin(async move {
                let result = future.await;
                permit.complete(Outcome::from_result(&result));
                result.map_err(BreakerError::Inner)
            }),
        }
    }
}
