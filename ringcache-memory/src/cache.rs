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
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use ringcache_common::{
    code::Value,
    event::{Event, EventListener},
};
use serde::{Deserialize, Serialize};

use crate::eviction::lru::{Lru, LruConfig};

/// Snapshot of the counters of a [`Cache`].
///
/// The counters are advisory, they are updated without synchronizing with the cache lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups.
    pub gets: u64,
    /// Lookups that found a value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries evicted to respect the limits.
    pub evictions: u64,
}

struct Counters {
    gets: AtomicU64,
    hits: AtomicU64,
    evictions: AtomicU64,
}

/// Counts evictions, then forwards every event to the user listener.
struct CountingListener<V> {
    counters: Arc<Counters>,
    listener: Option<Arc<dyn EventListener<V>>>,
}

impl<V> EventListener<V> for CountingListener<V>
where
    V: Value,
{
    fn on_leave(&self, reason: Event, key: &str, value: &V) {
        if reason == Event::Evict {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(listener) = self.listener.as_ref() {
            listener.on_leave(reason, key, value);
        }
    }
}

/// Thread-safe wrapper of [`Lru`].
///
/// The inner cache is built on the first [`Cache::add`]. Lookups take the same exclusive lock as insertions because
/// they update the recency order.
pub struct Cache<V>
where
    V: Value,
{
    config: LruConfig,
    listener: Option<Arc<dyn EventListener<V>>>,

    inner: Mutex<Option<Lru<V>>>,
    counters: Arc<Counters>,
}

impl<V> Debug for Cache<V>
where
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<V> Cache<V>
where
    V: Value,
{
    /// Create a cache with the given limits. Nothing is allocated until the first insertion.
    pub fn new(config: LruConfig) -> Self {
        Self {
            config,
            listener: None,
            inner: Mutex::new(None),
            counters: Arc::new(Counters {
                gets: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    /// Notify `listener` whenever an entry leaves the cache.
    ///
    /// The listener runs under the cache lock, it must not call back into this cache.
    pub fn with_event_listener(mut self, listener: Arc<dyn EventListener<V>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Limits of the cache.
    pub fn config(&self) -> &LruConfig {
        &self.config
    }

    /// Insert or replace the value of `key`.
    pub fn add(&self, key: impl Into<String>, value: V) {
        let mut inner = self.inner.lock();
        let lru = inner.get_or_insert_with(|| {
            tracing::trace!("[cache]: build lru with config: {:?}", self.config);
            let listener = CountingListener {
                counters: self.counters.clone(),
                listener: self.listener.clone(),
            };
            Lru::new(self.config).with_event_listener(Arc::new(listener))
        });
        lru.add(key, value);
    }

    /// Get a clone of the value of `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.counters.gets.fetch_add(1, Ordering::Relaxed);

        let value = self.inner.lock().as_mut().and_then(|lru| lru.get(key).cloned());
        if value.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Remove `key` explicitly.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.lock().as_mut().and_then(|lru| lru.remove(key))
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().as_ref().map(Lru::len).unwrap_or_default()
    }

    /// Whether the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed weight of the cached entries.
    pub fn usage(&self) -> usize {
        self.inner.lock().as_ref().map(Lru::usage).unwrap_or_default()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let gets = self.counters.gets.load(Ordering::Relaxed);
        let hits = self.counters.hits.load(Ordering::Relaxed);
        CacheStats {
            gets,
            hits,
            misses: gets.saturating_sub(hits),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}
