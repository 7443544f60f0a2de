// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock-file resource manager
//!
//! Acquire creates the file, takes an exclusive advisory lock on it and
//! writes the holder's PID. Release unlocks and removes it.

use async_trait::async_trait;
use fs2::FileExt;
use rem_core::{BoxError, ResourceError, ResourceManager};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Resource manager holding an exclusive lock on a file
#[derive(Debug)]
pub struct LockFileManager {
    name: String,
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl LockFileManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("lock:{}", path.display()),
            path,
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this manager currently holds the lock
    pub fn is_locked(&self) -> bool {
        self.file
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn open_locked(&self) -> Result<File, ResourceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)
            .map_err(|e| {
                ResourceError::AcquireFailed(format!(
                    "cannot open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.try_lock_exclusive().map_err(|_| {
            ResourceError::AcquireFailed(format!(
                "{} is locked by another holder",
                self.path.display()
            ))
        })?;

        file.set_len(0).map_err(|e| ResourceError::Other(BoxError::from(e)))?;
        writeln!(file, "{}", std::process::id())
            .map_err(|e| ResourceError::Other(BoxError::from(e)))?;

        Ok(file)
    }

    fn remove_locked(&self) -> Result<(), ResourceError> {
        let mut held = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if held.is_none() {
            return Err(ResourceError::ReleaseFailed(format!(
                "{} is not locked",
                self.path.display()
            )));
        }

        // remove while still locked; on failure the handle stays held
        std::fs::remove_file(&self.path).map_err(|e| {
            ResourceError::ReleaseFailed(format!(
                "cannot remove {}: {}",
                self.path.display(),
                e
            ))
        })?;
        if let Some(file) = held.take() {
            file.unlock()
                .map_err(|e| ResourceError::Other(BoxError::from(e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceManager for LockFileManager {
    async fn acquire_resources(&self) -> Result<(), ResourceError> {
        if self.is_locked() {
            return Err(ResourceError::AcquireFailed(format!(
                "{} is already held",
                self.path.display()
            )));
        }

        let file = self.open_locked()?;
        tracing::debug!(path = %self.path.display(), "lock file acquired");
        *self.file.lock().unwrap_or_else(|e| e.into_inner()) = Some(file);
        Ok(())
    }

    async fn release_resources(&self) -> Result<(), ResourceError> {
        self.remove_locked()?;
        tracing::debug!(path = %self.path.display(), "lock file released");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "lock_file_tests.rs"]
mod tests;
