// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for resource lifecycle calls
//!
//! A single manager call fails with a [`ResourceError`]. Every collection
//! phase reports its failures as one [`ErrorGroup`], even when only a single
//! member failed, so callers always match against one shape.

use std::fmt;
use thiserror::Error;

/// Boxed foreign error accepted from manager implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of one lifecycle call on one manager
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("acquire failed: {0}")]
    AcquireFailed(String),
    #[error("release failed: {0}")]
    ReleaseFailed(String),
    #[error("lifecycle task panicked: {0}")]
    Panicked(String),
    /// A nested collection failed as a whole
    #[error(transparent)]
    Group(#[from] ErrorGroup),
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl ResourceError {
    /// The aggregate carried by this error, if a nested collection failed
    pub fn group(&self) -> Option<&ErrorGroup> {
        match self {
            ResourceError::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Whether this error, or any cause nested below it, mentions `needle`
    pub fn contains_message(&self, needle: &str) -> bool {
        match self {
            ResourceError::Group(group) => group.contains_message(needle),
            other => other.to_string().contains(needle),
        }
    }
}

/// Lifecycle call that a member was running when it failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Acquire,
    Release,
    ReleaseOnError,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Acquire => "acquire",
            Phase::Release => "release",
            Phase::ReleaseOnError => "release_on_error",
        }
    }

    /// Whether this is one of the two release calls
    pub fn is_release(&self) -> bool {
        !matches!(self, Phase::Acquire)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One underlying cause inside an [`ErrorGroup`]
#[derive(Debug)]
pub struct MemberFailure {
    /// Position of the member in the collection
    pub index: usize,
    /// Name reported by the member
    pub name: String,
    pub phase: Phase,
    pub error: ResourceError,
}

impl fmt::Display for MemberFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.name, self.index, self.phase, self.error
        )
    }
}

/// Aggregate of every member failure from one collection phase
///
/// Failures keep member order and are never de-duplicated. Every group built
/// from member outcomes holds at least one cause; only
/// [`ErrorGroup::interrupted`] holds none. An acquire-phase
/// group may carry a second group of rollback failures, reachable through
/// [`ErrorGroup::rollback`] and `source()`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ErrorGroup {
    message: String,
    failures: Vec<MemberFailure>,
    #[source]
    rollback: Option<Box<ErrorGroup>>,
}

impl ErrorGroup {
    /// Group of acquire failures: "N resources were not acquired"
    pub fn not_acquired(failures: Vec<MemberFailure>) -> Self {
        Self {
            message: format!("{} resources were not acquired", failures.len()),
            failures,
            rollback: None,
        }
    }

    /// Group of release failures: "N resources were not released"
    pub fn not_released(failures: Vec<MemberFailure>) -> Self {
        Self {
            message: format!("{} resources were not released", failures.len()),
            failures,
            rollback: None,
        }
    }

    /// Group with no member causes, used when a phase was cut short
    /// (e.g. runtime shutdown) before any member reported back
    ///
    /// The only group that can be empty. `is_empty()` tells it apart.
    pub fn interrupted(phase: Phase) -> Self {
        Self {
            message: format!("{} phase was interrupted", phase),
            failures: Vec::new(),
            rollback: None,
        }
    }

    /// Chain the failures that happened while rolling back
    pub fn with_rollback(mut self, rollback: ErrorGroup) -> Self {
        self.rollback = Some(Box::new(rollback));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Primary failures, in member order
    pub fn failures(&self) -> &[MemberFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures raised while rolling back successfully acquired members
    pub fn rollback(&self) -> Option<&ErrorGroup> {
        self.rollback.as_deref()
    }

    /// Primary failures followed by rollback failures
    pub fn all_failures(&self) -> impl Iterator<Item = &MemberFailure> {
        self.failures
            .iter()
            .chain(self.rollback.iter().flat_map(|r| r.failures.iter()))
    }

    /// Indices of members with a primary failure
    pub fn failed_members(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    /// Whether any cause (primary, rollback or nested) mentions `needle`
    pub fn contains_message(&self, needle: &str) -> bool {
        self.all_failures().any(|f| f.error.contains_message(needle))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
