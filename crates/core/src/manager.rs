// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-resource lifecycle capability

use crate::error::ResourceError;
use async_trait::async_trait;
use std::sync::Arc;

/// Something with paired setup/teardown: a connection, a lock, a handle
///
/// `acquire_resources` is called at most once per scope entry. After a
/// successful acquire exactly one of `release_resources` or
/// `release_resources_on_error` follows. A manager whose acquire failed is
/// never released.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Set up the resource
    async fn acquire_resources(&self) -> Result<(), ResourceError>;

    /// Tear down after the scope exited normally
    async fn release_resources(&self) -> Result<(), ResourceError>;

    /// Tear down after the scope exited with an error
    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        self.release_resources().await
    }

    /// Label used when reporting failures of this manager
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a manager, as held by collections
pub type SharedManager = Arc<dyn ResourceManager>;

#[async_trait]
impl<M: ResourceManager + ?Sized> ResourceManager for Arc<M> {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        (**self).acquire_resources().await
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        (**self).release_resources().await
    }

    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        (**self).release_resources_on_error().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<'a, M: ResourceManager + ?Sized> ResourceManager for &'a M {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        (**self).acquire_resources().await
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        (**self).release_resources().await
    }

    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        (**self).release_resources_on_error().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<M: ResourceManager + ?Sized> ResourceManager for Box<M> {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        (**self).acquire_resources().await
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        (**self).release_resources().await
    }

    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        (**self).release_resources_on_error().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
