// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ResourceManagerCollection;
use crate::config::CollectionConfig;
use crate::manager::{ResourceManager, SharedManager};
use std::fmt;
use std::sync::Arc;

/// Collection over a fixed list of shared managers
#[derive(Clone, Default)]
pub struct ManagerSet {
    managers: Vec<SharedManager>,
    config: CollectionConfig,
}

impl ManagerSet {
    pub fn new(managers: Vec<SharedManager>) -> Self {
        Self {
            managers,
            config: CollectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CollectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a set from concrete managers of one type
    pub fn from_managers<M, I>(managers: I) -> Self
    where
        M: ResourceManager + 'static,
        I: IntoIterator<Item = Arc<M>>,
    {
        Self::new(
            managers
                .into_iter()
                .map(|m| m as SharedManager)
                .collect(),
        )
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl ResourceManagerCollection for ManagerSet {
    fn resource_managers(&self) -> &[SharedManager] {
        &self.managers
    }

    fn collection_config(&self) -> CollectionConfig {
        self.config.clone()
    }
}

impl fmt::Debug for ManagerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerSet")
            .field("name", &self.config.name)
            .field(
                "members",
                &self.managers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FromIterator<SharedManager> for ManagerSet {
    fn from_iter<I: IntoIterator<Item = SharedManager>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
