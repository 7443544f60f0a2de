// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake resource manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::error::ResourceError;
use crate::manager::ResourceManager;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Recorded lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerCall {
    Acquire,
    Release,
    ReleaseOnError,
}

/// Observable state of a fake manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeState {
    pub acquired: bool,
    pub released: bool,
    pub release_on_error_called: bool,
}

#[derive(Debug, Default)]
struct FakeFailures {
    acquire: Option<String>,
    release: Option<String>,
    release_on_error: Option<String>,
}

/// Fake resource manager for testing
///
/// A successful release clears `acquired` and sets `released`; a failed
/// release leaves the state untouched. The on-error release behaves like a
/// release that also sets `release_on_error_called`.
#[derive(Clone)]
pub struct FakeResourceManager {
    name: String,
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<Vec<ManagerCall>>>,
    failures: Arc<Mutex<FakeFailures>>,
    delay: Arc<Mutex<Option<Duration>>>,
    gate: Arc<watch::Sender<bool>>,
}

impl FakeResourceManager {
    pub fn new(name: impl Into<String>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(FakeState::default())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(FakeFailures::default())),
            delay: Arc::new(Mutex::new(None)),
            gate: Arc::new(gate),
        }
    }

    /// A fake whose acquire blocks until [`open_gate`](Self::open_gate)
    pub fn gated(name: impl Into<String>) -> Self {
        let fake = Self::new(name);
        fake.gate.send_replace(false);
        fake
    }

    /// Sleep this long inside every acquire and release call
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = Some(delay);
        self
    }

    /// Let blocked acquire calls proceed
    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// Make the next acquire calls fail with `message`
    pub fn fail_acquire(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .acquire = Some(message.into());
    }

    /// Make the next release calls fail with `message`
    pub fn fail_release(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .release = Some(message.into());
    }

    /// Make the next on-error release calls fail with `message`
    pub fn fail_release_on_error(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .release_on_error = Some(message.into());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ManagerCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of recorded calls of one kind
    pub fn call_count(&self, call: ManagerCall) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    pub fn state(&self) -> FakeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_acquired(&self) -> bool {
        self.state().acquired
    }

    pub fn is_released(&self) -> bool {
        self.state().released
    }

    pub fn release_on_error_called(&self) -> bool {
        self.state().release_on_error_called
    }

    fn record(&self, call: ManagerCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn wait_for_gate(&self) -> Result<(), ResourceError> {
        let mut rx = self.gate.subscribe();
        while !*rx.borrow_and_update() {
            rx.changed()
                .await
                .map_err(|_| ResourceError::AcquireFailed("gate dropped".to_string()))?;
        }
        Ok(())
    }

    fn failure(&self, call: ManagerCall) -> Option<String> {
        let failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        match call {
            ManagerCall::Acquire => failures.acquire.clone(),
            ManagerCall::Release => failures.release.clone(),
            ManagerCall::ReleaseOnError => failures.release_on_error.clone(),
        }
    }

    fn mark_released(&self, on_error: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.acquired = false;
        state.released = true;
        if on_error {
            state.release_on_error_called = true;
        }
    }
}

impl Default for FakeResourceManager {
    fn default() -> Self {
        Self::new("fake")
    }
}

#[async_trait]
impl ResourceManager for FakeResourceManager {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        self.record(ManagerCall::Acquire);
        self.pause().await;
        self.wait_for_gate().await?;

        if let Some(message) = self.failure(ManagerCall::Acquire) {
            return Err(ResourceError::AcquireFailed(message));
        }

        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .acquired = true;
        Ok(())
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        self.record(ManagerCall::Release);
        self.pause().await;

        if let Some(message) = self.failure(ManagerCall::Release) {
            return Err(ResourceError::ReleaseFailed(message));
        }

        self.mark_released(false);
        Ok(())
    }

    async fn release_resources_on_error(&self) -> Result<(), ResourceError> {
        self.record(ManagerCall::ReleaseOnError);
        self.pause().await;

        if let Some(message) = self.failure(ManagerCall::ReleaseOnError) {
            return Err(ResourceError::ReleaseFailed(message));
        }

        self.mark_released(true);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
