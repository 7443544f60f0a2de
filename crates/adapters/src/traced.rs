// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced manager wrapper for consistent observability

use async_trait::async_trait;
use rem_core::{ResourceError, ResourceManager};
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any ResourceManager
#[derive(Clone, Debug)]
pub struct TracedResourceManager<M> {
    inner: M,
}

impl<M> TracedResourceManager<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: ResourceManager> ResourceManager for TracedResourceManager<M> {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        let span = tracing::info_span!("resource.acquire", name = self.inner.name());

        async {
            tracing::info!("acquiring");

            let start = Instant::now();
            let result = self.inner.acquire_resources().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "acquired"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "acquire failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        let span = tracing::info_span!("resource.release", name = self.inner.name());

        async {
            let start = Instant::now();
            let result = self.inner.release_resources().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "released"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "release failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        let span = tracing::info_span!("resource.release_on_error", name = self.inner.name());

        async {
            tracing::debug!("releasing after error");
            let result = self.inner.release_resources_on_error().await;

            // the scope is already failing; this is reported, not escalated
            match &result {
                Ok(()) => tracing::info!("released"),
                Err(e) => tracing::warn!(error = %e, "release on error failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
