// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource manager collections
//!
//! A collection coordinates a fixed group of managers as one unit:
//! - **Acquire** races every member and rolls back the winners if any member fails
//! - **Release** tears every member down and aggregates all failures
//! - [`ManagerSet`] is the stock collection over a list of shared managers
//! - [`CollectionManager`] lets any collection act as a single manager, so
//!   collections nest

mod phase;
mod set;

pub use set::ManagerSet;

use crate::config::CollectionConfig;
use crate::error::{ErrorGroup, Phase, ResourceError};
use crate::manager::{ResourceManager, SharedManager};
use async_trait::async_trait;

/// A fixed group of resource managers driven concurrently
///
/// Implementors only provide the member accessor; acquire and release are
/// provided. Members must stay the same for the duration of a phase.
#[async_trait]
pub trait ResourceManagerCollection: Send + Sync {
    /// The members of this collection, in reporting order
    fn resource_managers(&self) -> &[SharedManager];

    fn collection_config(&self) -> CollectionConfig {
        CollectionConfig::default()
    }

    /// Acquire every member concurrently.
    ///
    /// If any member fails, members that did acquire receive
    /// `release_resources_on_error` before this returns. The error holds the
    /// acquire failures; rollback failures are chained behind them.
    async fn acquire_resources(&self) -> Result<(), ErrorGroup> {
        phase::acquire(self.resource_managers(), &self.collection_config()).await
    }

    /// Release every member concurrently after a normal exit
    async fn release_resources(&self) -> Result<(), ErrorGroup> {
        phase::release(
            self.resource_managers(),
            &self.collection_config(),
            Phase::Release,
        )
        .await
    }

    /// Release every member concurrently after an error exit
    async fn release_resources_on_error(&self) -> Result<(), ErrorGroup> {
        phase::release(
            self.resource_managers(),
            &self.collection_config(),
            Phase::ReleaseOnError,
        )
        .await
    }
}

#[async_trait]
impl<'a, C: ResourceManagerCollection + ?Sized> ResourceManagerCollection for &'a C {
    fn resource_managers(&self) -> &[SharedManager] {
        (**self).resource_managers()
    }

    fn collection_config(&self) -> CollectionConfig {
        (**self).collection_config()
    }

    async fn acquire_resources(&self) -> Result<(), ErrorGroup> {
        (**self).acquire_resources().await
    }

    async fn release_resources(&self) -> Result<(), ErrorGroup> {
        (**self).release_resources().await
    }

    async fn release_resources_on_error(&self) -> Result<(), ErrorGroup> {
        (**self).release_resources_on_error().await
    }
}

/// On-error release of `managers` that owns everything it touches
pub(crate) async fn release_detached(
    managers: Vec<SharedManager>,
    config: CollectionConfig,
) -> Result<(), ErrorGroup> {
    phase::release(&managers, &config, Phase::ReleaseOnError).await
}

/// Adapter presenting a collection as a single [`ResourceManager`]
///
/// Collection failures surface as [`ResourceError::Group`].
#[derive(Debug, Clone)]
pub struct CollectionManager<C> {
    inner: C,
    name: String,
}

impl<C: ResourceManagerCollection> CollectionManager<C> {
    pub fn new(inner: C) -> Self {
        let name = inner.collection_config().name;
        Self { inner, name }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: ResourceManagerCollection> ResourceManager for CollectionManager<C> {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        Ok(self.inner.acquire_resources().await?)
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        Ok(self.inner.release_resources().await?)
    }

    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        Ok(self.inner.release_resources_on_error().await?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
