// Copyright 2026 ringcache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::{Arc, LazyLock};

use hashbrown::HashMap;
use itertools::Itertools;
use parking_lot::RwLock;
use ringcache_common::error::{Error, Result};

use crate::{
    group::{Group, GroupBuilder},
    source::DataSource,
};

static GLOBAL: LazyLock<Arc<GroupRegistry>> = LazyLock::new(|| Arc::new(GroupRegistry::new()));

/// Name to [`Group`] mapping.
///
/// Names are unique. Groups live as long as the registry, there is no removal.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<GroupRegistry> {
        GLOBAL.clone()
    }

    /// Create and register group `name` with a byte limit of `capacity`.
    ///
    /// Fails with [`ErrorKind::Config`](ringcache_common::error::ErrorKind::Config) if the name is taken, the
    /// registered group is left untouched.
    pub fn new_group(&self, name: impl Into<String>, capacity: usize, source: impl DataSource) -> Result<Arc<Group>> {
        self.register(GroupBuilder::new(name).with_capacity(capacity).with_source(source))
    }

    /// Build and register a group.
    ///
    /// Fails with [`ErrorKind::Config`](ringcache_common::error::ErrorKind::Config) if the name is taken or the
    /// builder is incomplete.
    pub fn register(&self, builder: GroupBuilder) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();

        if groups.contains_key(builder.name()) {
            return Err(Error::config("group already exists").with_context("group", builder.name()));
        }

        let group = Arc::new(builder.build()?);
        groups.insert(group.name().to_string(), group.clone());
        tracing::info!(
            "[group registry]: group {} registered, capacity: {}, max entries: {}",
            group.name(),
            group.capacity(),
            group.max_entries()
        );

        Ok(group)
    }

    /// Get group `name`.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Names of the registered groups, sorted.
    pub fn names(&self) -> Vec<String> {
        self.groups.read().keys().cloned().sorted().collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use ringcache_common::error::ErrorKind;

    use super::*;

    fn source(key: &str) -> anyhow::Result<Vec<u8>> {
        Ok(key.as_bytes().to_vec())
    }

    #[test]
    fn test_registry() {
        let registry = GroupRegistry::new();
        assert!(registry.get_group("scores").is_none());

        let scores = registry.new_group("scores", 2 << 10, source).unwrap();
        registry
            .register(GroupBuilder::new("names").with_max_entries(8).with_source(source))
            .unwrap();

        let got = registry.get_group("scores").unwrap();
        assert!(Arc::ptr_eq(&scores, &got));
        assert_eq!(got.capacity(), 2048);
        assert_eq!(registry.names(), vec!["names".to_string(), "scores".to_string()]);
    }

    #[test]
    fn test_registry_duplicate_name() {
        let registry = GroupRegistry::new();

        let scores = registry.new_group("scores", 2048, source).unwrap();
        scores.get("Tom").unwrap();

        let e = registry.new_group("scores", 4096, source).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Config);

        // The first group stays registered with its state.
        let got = registry.get_group("scores").unwrap();
        assert!(Arc::ptr_eq(&scores, &got));
        assert_eq!(got.capacity(), 2048);
        assert_eq!(got.stats().gets, 1);
    }

    #[test]
    fn test_registry_incomplete_builder() {
        let registry = GroupRegistry::new();
        let e = registry.register(GroupBuilder::new("scores")).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Config);
        assert!(registry.get_group("scores").is_none());
    }

    #[test]
    fn test_global_registry() {
        let r1 = GroupRegistry::global();
        let r2 = GroupRegistry::global();
        assert!(Arc::ptr_eq(&r1, &r2));
    }
}
