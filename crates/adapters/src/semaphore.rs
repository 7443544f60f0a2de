// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore-backed resource manager
//!
//! Holds `weight` permits of a shared semaphore between acquire and release,
//! limiting how many scopes may use a resource at once.

use async_trait::async_trait;
use rem_core::{ResourceError, ResourceManager};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Resource manager holding permits of a shared semaphore
#[derive(Debug)]
pub struct SemaphoreManager {
    name: String,
    semaphore: Arc<Semaphore>,
    weight: u32,
    /// Fail instead of waiting when no permits are free
    no_wait: bool,
    permit: Mutex<Option<OwnedSemaphorePermit>>,
}

impl SemaphoreManager {
    pub fn new(name: impl Into<String>, semaphore: Arc<Semaphore>) -> Self {
        Self {
            name: name.into(),
            semaphore,
            weight: 1,
            no_wait: false,
            permit: Mutex::new(None),
        }
    }

    /// Number of permits held while acquired
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Fail acquisition immediately when the semaphore is exhausted
    pub fn without_waiting(mut self) -> Self {
        self.no_wait = true;
        self
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Whether this manager currently holds its permits
    pub fn is_held(&self) -> bool {
        self.permit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn take_permit(&self) -> Result<OwnedSemaphorePermit, ResourceError> {
        self.permit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| {
                ResourceError::ReleaseFailed(format!("semaphore {} is not held", self.name))
            })
    }
}

#[async_trait]
impl ResourceManager for SemaphoreManager {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        if self.is_held() {
            return Err(ResourceError::AcquireFailed(format!(
                "semaphore {} is already held",
                self.name
            )));
        }

        let semaphore = Arc::clone(&self.semaphore);
        let permit = if self.no_wait {
            semaphore
                .try_acquire_many_owned(self.weight)
                .map_err(|e| match e {
                    TryAcquireError::NoPermits => ResourceError::AcquireFailed(format!(
                        "semaphore {} has fewer than {} permits available",
                        self.name, self.weight
                    )),
                    TryAcquireError::Closed => {
                        ResourceError::AcquireFailed(format!("semaphore {} is closed", self.name))
                    }
                })?
        } else {
            semaphore
                .acquire_many_owned(self.weight)
                .await
                .map_err(|_| {
                    ResourceError::AcquireFailed(format!("semaphore {} is closed", self.name))
                })?
        };

        tracing::debug!(name = %self.name, weight = self.weight, "permits acquired");
        *self.permit.lock().unwrap_or_else(|e| e.into_inner()) = Some(permit);
        Ok(())
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        let permit = self.take_permit()?;
        drop(permit);
        tracing::debug!(name = %self.name, weight = self.weight, "permits released");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
