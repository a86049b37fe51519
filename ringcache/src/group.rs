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

use std::{
    fmt::Debug,
    sync::{Arc, OnceLock},
};

use ringcache_common::{
    error::{Error, Result},
    event::EventListener,
    metrics::{registry::noop::NoopMetricsRegistry, BoxedRegistry, Metrics},
    view::ByteView,
};
use ringcache_memory::{Cache, CacheStats, Coalescer, LruConfig};

use crate::{
    peer::{PeerGetter, PeerPicker, Request},
    source::DataSource,
};

/// Builder of a [`Group`].
pub struct GroupBuilder {
    name: String,
    capacity: usize,
    max_entries: usize,
    source: Option<Arc<dyn DataSource>>,
    event_listener: Option<Arc<dyn EventListener<ByteView>>>,
    registry: BoxedRegistry,
}

impl Debug for GroupBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupBuilder")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("max_entries", &self.max_entries)
            .field("registry", &self.registry)
            .finish()
    }
}

impl GroupBuilder {
    /// Create a builder of group `name`. The cache is unbounded unless limited.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: 0,
            max_entries: 0,
            source: None,
            event_listener: None,
            registry: Box::new(NoopMetricsRegistry),
        }
    }

    /// Name of the group to build.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Limit the summed weight of the cached entries, in bytes. `0` means unbounded.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Limit the number of cached entries. `0` means unbounded.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the data source. Required.
    pub fn with_source(mut self, source: impl DataSource) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Notify `event_listener` whenever an entry leaves the local cache.
    pub fn with_event_listener(mut self, event_listener: Arc<dyn EventListener<ByteView>>) -> Self {
        self.event_listener = Some(event_listener);
        self
    }

    /// Record the group metrics in `registry`.
    ///
    /// Default: [`NoopMetricsRegistry`].
    pub fn with_metrics_registry(mut self, registry: BoxedRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Build the group.
    ///
    /// Fails with [`ErrorKind::Config`](ringcache_common::error::ErrorKind::Config) if the name is empty or no data
    /// source is set.
    pub fn build(self) -> Result<Group> {
        if self.name.is_empty() {
            return Err(Error::config("group name is required"));
        }
        let source = self
            .source
            .ok_or_else(|| Error::config("data source is required").with_context("group", &self.name))?;

        let mut cache = Cache::new(LruConfig {
            max_bytes: self.capacity,
            max_entries: self.max_entries,
        });
        if let Some(event_listener) = self.event_listener {
            cache = cache.with_event_listener(event_listener);
        }

        let metrics = Metrics::new(self.name.clone(), self.registry.as_ref());

        Ok(Group {
            name: self.name,
            cache,
            coalescer: Coalescer::new(),
            source,
            picker: OnceLock::new(),
            metrics,
        })
    }
}

/// A named cache namespace backed by a data source.
///
/// [`Group::get`] serves from the local cache. On a miss, concurrent gets of the same key are coalesced into a single
/// load, which asks the remote owner picked by the registered [`PeerPicker`], or loads from the [`DataSource`] when
/// the key is owned locally or the remote owner fails. Only values loaded from the data source are cached locally.
pub struct Group {
    name: String,

    cache: Cache<ByteView>,
    coalescer: Coalescer<ByteView>,

    source: Arc<dyn DataSource>,
    picker: OnceLock<Arc<dyn PeerPicker>>,

    metrics: Metrics,
}

impl Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .field("has_picker", &self.has_picker())
            .finish()
    }
}

impl Group {
    /// Get the value of `key`.
    pub fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(Error::empty_key());
        }

        self.metrics.get.increase(1);

        if let Some(value) = self.cache.get(key) {
            tracing::debug!("[group]: {} cache hit, key: {key}", self.name);
            self.metrics.hit.increase(1);
            return Ok(value);
        }

        self.metrics.miss.increase(1);
        self.load(key)
    }

    /// Bind the picker choosing remote owners.
    ///
    /// # Panics
    ///
    /// Panics if a picker is already registered.
    pub fn register_picker(&self, picker: Arc<dyn PeerPicker>) {
        if self.picker.set(picker).is_err() {
            panic!("[group]: {} register picker called more than once", self.name);
        }
    }

    /// Name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte limit of the local cache. `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.cache.config().max_bytes
    }

    /// Entry limit of the local cache. `0` means unbounded.
    pub fn max_entries(&self) -> usize {
        self.cache.config().max_entries
    }

    /// Counters of the local cache.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Summed weight of the locally cached entries.
    pub fn usage(&self) -> usize {
        self.cache.usage()
    }

    /// Whether a picker is registered.
    pub fn has_picker(&self) -> bool {
        self.picker.get().is_some()
    }

    fn load(&self, key: &str) -> Result<ByteView> {
        self.coalescer.call(key, || {
            self.metrics.load.increase(1);

            if let Some(getter) = self.picker.get().and_then(|picker| picker.pick_node(key)) {
                match self.get_from_peer(getter.as_ref(), key) {
                    Ok(value) => {
                        self.metrics.peer_load.increase(1);
                        return Ok(value);
                    }
                    Err(e) => {
                        self.metrics.peer_error.increase(1);
                        tracing::warn!(
                            "[group]: {} get from peer failed, fall back to source, key: {key}, error: {e}",
                            self.name
                        );
                    }
                }
            }

            self.get_locally(key)
        })
    }

    fn get_from_peer(&self, getter: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let request = Request {
            group: self.name.clone(),
            key: key.to_string(),
        };
        let response = getter.get(&request)?;
        Ok(ByteView::from(response.value))
    }

    fn get_locally(&self, key: &str) -> Result<ByteView> {
        match self.source.get(key) {
            Ok(bytes) => {
                self.metrics.source_load.increase(1);
                let value = ByteView::from(bytes);
                self.cache.add(key, value.clone());
                Ok(value)
            }
            Err(e) => {
                self.metrics.source_error.increase(1);
                let e = Error::source_load(key, e).with_context("group", &self.name);
                tracing::warn!("[group]: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ringcache_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_group_builder() {
        let e = GroupBuilder::new("scores").with_capacity(2048).build().unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Config);

        let e = GroupBuilder::new("")
            .with_source(|_: &str| -> anyhow::Result<Vec<u8>> { Ok(vec![]) })
            .build()
            .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Config);

        let group = GroupBuilder::new("scores")
            .with_capacity(2048)
            .with_max_entries(16)
            .with_source(|key: &str| -> anyhow::Result<Vec<u8>> { Ok(key.as_bytes().to_vec()) })
            .build()
            .unwrap();
        assert_eq!(group.name(), "scores");
        assert_eq!(group.capacity(), 2048);
        assert_eq!(group.max_entries(), 16);
        assert!(!group.has_picker());
    }

    #[test]
    fn test_group_empty_key() {
        let loads = Arc::new(AtomicUsize::new(0));
        let l = loads.clone();
        let group = GroupBuilder::new("scores")
            .with_source(move |_: &str| -> anyhow::Result<Vec<u8>> {
                l.fetch_add(1, Ordering::Relaxed);
                Ok(vec![])
            })
            .build()
            .unwrap();

        let e = group.get("").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidRequest);
        assert_eq!(loads.load(Ordering::Relaxed), 0);
        assert_eq!(group.stats().gets, 0);
    }

    #[test]
    #[should_panic]
    fn test_group_register_picker_twice() {
        struct Local;

        impl PeerPicker for Local {
            fn pick_node(&self, _: &str) -> Option<Arc<dyn PeerGetter>> {
                None
            }
        }

        let group = GroupBuilder::new("scores")
            .with_source(|_: &str| -> anyhow::Result<Vec<u8>> { Ok(vec![]) })
            .build()
            .unwrap();
        group.register_picker(Arc::new(Local));
        assert!(group.has_picker());
        group.register_picker(Arc::new(Local));
    }
}
