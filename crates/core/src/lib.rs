// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! rem-core: resource lifecycle coordination
//!
//! This crate provides:
//! - The [`ResourceManager`] acquire/release capability
//! - [`ResourceManagerCollection`], which acquires and releases many managers
//!   concurrently with rollback on partial failure
//! - [`ErrorGroup`], the aggregate reported by every collection phase
//! - Scoped entry points that run a body between acquire and release

pub mod collection;
pub mod config;
pub mod error;
pub mod manager;
pub mod scope;

pub use collection::{CollectionManager, ManagerSet, ResourceManagerCollection};
pub use config::CollectionConfig;
pub use error::{BoxError, ErrorGroup, MemberFailure, Phase, ResourceError};
pub use manager::{ResourceManager, SharedManager};
pub use scope::{
    guard, guard_collection, scoped, scoped_collection, CollectionScope, DetachedExit, Guarded,
    Lifecycle, ManagerScope, ScopeError,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResourceManager, FakeState, ManagerCall};
