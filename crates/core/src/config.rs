// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collection configuration

use serde::Deserialize;

/// Settings for one resource manager collection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Label used in spans and logs
    pub name: String,
    /// Drive acquisition from a supervisor task so that members acquired
    /// after the caller went away are still rolled back
    pub supervise_acquire: bool,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_supervised_acquire(mut self, supervise: bool) -> Self {
        self.supervise_acquire = supervise;
        self
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "collection".to_string(),
            supervise_acquire: true,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
