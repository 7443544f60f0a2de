// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op resource manager for slots that hold nothing.

use async_trait::async_trait;
use rem_core::{ResourceError, ResourceManager};

/// Resource manager that does nothing.
///
/// Used to fill a collection slot when a resource is disabled in a
/// deployment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpResourceManager;

impl NoOpResourceManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResourceManager for NoOpResourceManager {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        Ok(())
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
