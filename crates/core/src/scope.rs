// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped acquisition: run a body between acquire and release
//!
//! - [`scoped`] / [`scoped_collection`] wrap one async body
//! - [`guard`] / [`guard_collection`] build a reusable decorator-style
//!   wrapper around an async function
//!
//! A body error routes every member to the on-error release. When both the
//! body and the release fail, the error carries both.
//!
//! A collection scope dropped between acquire and release (timeout, `select!`,
//! aborted task, panicking body) spawns an on-error release of every member
//! onto the current runtime. A single-manager scope borrows its manager and
//! cannot do that; put the manager in a [`ManagerSet`](crate::ManagerSet) when
//! it must be released on cancellation.

use crate::collection::{release_detached, ResourceManagerCollection};
use crate::error::{ErrorGroup, ResourceError};
use crate::manager::ResourceManager;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Owned on-error release, runnable after the scope itself is gone
pub type DetachedExit = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Failure of one scoped run
///
/// `R` is the lifecycle error: [`ResourceError`] for a single manager,
/// [`ErrorGroup`] for a collection.
#[derive(Debug, Error)]
pub enum ScopeError<E, R = ResourceError> {
    /// Acquisition failed; the body never ran
    #[error("failed to acquire resources: {0}")]
    Acquire(#[source] R),
    /// The body failed; release succeeded
    #[error("{0}")]
    Body(E),
    /// The body succeeded; release failed
    #[error("failed to release resources: {0}")]
    Release(#[source] R),
    /// The body failed and so did the release that followed
    #[error("{body} (and failed to release resources: {release})")]
    BodyAndRelease {
        #[source]
        body: E,
        release: R,
    },
}

impl<E, R> ScopeError<E, R> {
    /// The body's error, if the body failed
    pub fn body(&self) -> Option<&E> {
        match self {
            ScopeError::Body(body) | ScopeError::BodyAndRelease { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The acquire or release error, if the lifecycle failed
    pub fn lifecycle(&self) -> Option<&R> {
        match self {
            ScopeError::Acquire(err)
            | ScopeError::Release(err)
            | ScopeError::BodyAndRelease { release: err, .. } => Some(err),
            ScopeError::Body(_) => None,
        }
    }

    pub fn into_body(self) -> Option<E> {
        match self {
            ScopeError::Body(body) | ScopeError::BodyAndRelease { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_acquire(&self) -> bool {
        matches!(self, ScopeError::Acquire(_))
    }
}

/// Entry/exit pair shared by managers and collections
#[async_trait]
pub trait Lifecycle: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Acquire; on error nothing is held
    async fn enter(&self) -> Result<(), Self::Error>;

    /// Release, on the error path when `body_failed`
    async fn exit(&self, body_failed: bool) -> Result<(), Self::Error>;

    /// On-error release for a scope dropped after `enter` and before `exit`
    fn detached_exit(&self) -> Option<DetachedExit> {
        None
    }
}

/// Lifecycle of a single manager
#[derive(Debug, Clone)]
pub struct ManagerScope<M>(pub M);

#[async_trait]
impl<M: ResourceManager> Lifecycle for ManagerScope<M> {
    type Error = ResourceError;

    async fn enter(&self) -> Result<(), ResourceError> {
        self.0.acquire_resources().await
    }

    async fn exit(&self, body_failed: bool) -> Result<(), ResourceError> {
        if body_failed {
            self.0.release_resources_on_error().await
        } else {
            self.0.release_resources().await
        }
    }
}

/// Lifecycle of a collection
#[derive(Debug, Clone)]
pub struct CollectionScope<C>(pub C);

#[async_trait]
impl<C: ResourceManagerCollection> Lifecycle for CollectionScope<C> {
    type Error = ErrorGroup;

    async fn enter(&self) -> Result<(), ErrorGroup> {
        self.0.acquire_resources().await
    }

    async fn exit(&self, body_failed: bool) -> Result<(), ErrorGroup> {
        if body_failed {
            self.0.release_resources_on_error().await
        } else {
            self.0.release_resources().await
        }
    }

    fn detached_exit(&self) -> Option<DetachedExit> {
        let managers = self.0.resource_managers().to_vec();
        let config = self.0.collection_config();
        Some(Box::pin(async move {
            if let Err(group) = release_detached(managers, config).await {
                tracing::error!(error = %group, "release of dropped scope failed");
            }
        }))
    }
}

/// Spawns the detached exit on drop unless disarmed
struct ExitGuard {
    pending: Option<DetachedExit>,
}

impl ExitGuard {
    fn disarm(&mut self) {
        self.pending = None;
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let Some(exit) = self.pending.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!("scope dropped before release, releasing on error");
                handle.spawn(exit);
            }
            Err(_) => tracing::error!("scope dropped outside a runtime, resources not released"),
        }
    }
}

/// Acquire, run `body`, then release according to how `body` ended
pub async fn run<L, F, Fut, T, E>(lifecycle: &L, body: F) -> Result<T, ScopeError<E, L::Error>>
where
    L: Lifecycle + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    lifecycle.enter().await.map_err(ScopeError::Acquire)?;
    tracing::trace!("scope entered");
    let mut guard = ExitGuard {
        pending: lifecycle.detached_exit(),
    };

    let outcome = body().await;
    let body_failed = outcome.is_err();
    let exit = lifecycle.exit(body_failed);
    guard.disarm();
    let exit = exit.await;
    tracing::trace!(body_failed, release_failed = exit.is_err(), "scope exited");

    match (outcome, exit) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release)) => Err(ScopeError::Release(release)),
        (Err(body), Ok(())) => Err(ScopeError::Body(body)),
        (Err(body), Err(release)) => Err(ScopeError::BodyAndRelease { body, release }),
    }
}

/// Run `body` while `manager` holds its resources
///
/// A manager whose acquire fails is not released.
pub async fn scoped<M, F, Fut, T, E>(manager: &M, body: F) -> Result<T, ScopeError<E>>
where
    M: ResourceManager + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    run(&ManagerScope(manager), body).await
}

/// Run `body` while every member of `collection` holds its resources
pub async fn scoped_collection<C, F, Fut, T, E>(
    collection: &C,
    body: F,
) -> Result<T, ScopeError<E, ErrorGroup>>
where
    C: ResourceManagerCollection + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    run(&CollectionScope(collection), body).await
}

/// An async function wrapped in acquire/release
///
/// Every [`call`](Guarded::call) is one full lifecycle cycle.
#[derive(Debug, Clone)]
pub struct Guarded<L, F> {
    lifecycle: L,
    func: F,
}

impl<L: Lifecycle, F> Guarded<L, F> {
    pub fn new(lifecycle: L, func: F) -> Self {
        Self { lifecycle, func }
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    /// Acquire, call the wrapped function with `args`, release
    pub async fn call<A, Fut, T, E>(&self, args: A) -> Result<T, ScopeError<E, L::Error>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        run(&self.lifecycle, || (self.func)(args)).await
    }
}

/// Wrap `func` so each call runs inside a scope of `manager`
pub fn guard<M: ResourceManager, F>(manager: M, func: F) -> Guarded<ManagerScope<M>, F> {
    Guarded::new(ManagerScope(manager), func)
}

/// Wrap `func` so each call runs inside a scope of `collection`
pub fn guard_collection<C: ResourceManagerCollection, F>(
    collection: C,
    func: F,
) -> Guarded<CollectionScope<C>, F> {
    Guarded::new(CollectionScope(collection), func)
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
