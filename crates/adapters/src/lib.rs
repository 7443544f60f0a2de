// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Concrete resource managers

pub mod lock_file;
pub mod noop;
pub mod semaphore;
pub mod traced;

pub use lock_file::LockFileManager;
pub use noop::NoOpResourceManager;
pub use semaphore::SemaphoreManager;
pub use traced::TracedResourceManager;
