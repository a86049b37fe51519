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

use std::{fmt::Debug, sync::Arc};

use hashbrown::HashMap;
use ringcache_common::{
    code::Value,
    event::{Event, EventListener},
};
use serde::{Deserialize, Serialize};

use crate::slab::{Slab, Token};

/// Limits of an [`Lru`].
///
/// A zero limit means unbounded in that dimension. Both limits may be active together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LruConfig {
    /// Upper bound of the summed entry weights, in bytes.
    pub max_bytes: usize,
    /// Upper bound of the entry count.
    pub max_entries: usize,
}

impl LruConfig {
    /// Limits bounding the summed entry weights only.
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            max_entries: 0,
        }
    }
}

struct Node<V> {
    key: String,
    value: V,
    weight: usize,

    prev: Option<Token>,
    next: Option<Token>,
}

/// Bounded key-value store that evicts the least recently used entry first.
///
/// An entry weighs its key length plus [`Value::weight`]. After every [`Lru::add`] the summed weight and the entry
/// count respect the configured limits.
///
/// [`Lru`] has no concurrency control of its own, see [`crate::Cache`] for the thread-safe wrapper.
pub struct Lru<V>
where
    V: Value,
{
    config: LruConfig,

    slab: Slab<Node<V>>,
    index: HashMap<String, Token>,

    /// Most recently used.
    head: Option<Token>,
    /// Least recently used.
    tail: Option<Token>,

    usage: usize,

    listener: Option<Arc<dyn EventListener<V>>>,
}

impl<V> Debug for Lru<V>
where
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lru")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("usage", &self.usage)
            .finish()
    }
}

impl<V> Lru<V>
where
    V: Value,
{
    /// Create an empty cache with the given limits.
    pub fn new(config: LruConfig) -> Self {
        Self {
            config,
            slab: Slab::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            usage: 0,
            listener: None,
        }
    }

    /// Notify `listener` whenever an entry leaves the cache.
    pub fn with_event_listener(mut self, listener: Arc<dyn EventListener<V>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Limits of the cache.
    pub fn config(&self) -> &LruConfig {
        &self.config
    }

    /// Insert or replace the value of `key` and mark it most recently used.
    ///
    /// Least recently used entries are evicted until both limits hold again. An entry heavier than `max_bytes` is
    /// evicted right after its insertion.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let weight = key.len() + value.weight();

        match self.index.get(&key).copied() {
            Some(token) => {
                self.move_to_front(token);

                let node = &mut self.slab[token];
                let old = std::mem::replace(&mut node.value, value);
                self.usage = self.usage - node.weight + weight;
                node.weight = weight;

                if let Some(listener) = self.listener.as_ref() {
                    listener.on_leave(Event::Replace, &node.key, &old);
                }
            }
            None => {
                let token = self.slab.insert(Node {
                    key: key.clone(),
                    value,
                    weight,
                    prev: None,
                    next: None,
                });
                self.link_front(token);
                self.index.insert(key, token);
                self.usage += weight;
            }
        }

        while self.is_exceeded() {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Get the value of `key` and mark it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let token = self.index.get(key).copied()?;
        self.move_to_front(token);
        Some(&self.slab[token].value)
    }

    /// Whether `key` is cached. Does not touch the recency order.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove `key` explicitly.
    ///
    /// The listener is notified with [`Event::Remove`].
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let token = self.index.get(key).copied()?;
        let node = self.detach(token)?;
        self.notify(Event::Remove, &node.key, &node.value);
        Some(node.value)
    }

    /// Evict the least recently used entry.
    ///
    /// The listener is notified with [`Event::Evict`].
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let token = self.tail?;
        let node = self.detach(token)?;
        self.notify(Event::Evict, &node.key, &node.value);
        Some((node.key, node.value))
    }

    /// Drop every entry.
    ///
    /// The listener is notified with [`Event::Clear`] for each entry, most recently used first.
    pub fn clear(&mut self) {
        if let Some(listener) = self.listener.as_ref() {
            let mut cursor = self.head;
            while let Some(token) = cursor {
                let node = &self.slab[token];
                listener.on_leave(Event::Clear, &node.key, &node.value);
                cursor = node.next;
            }
        }

        self.slab.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.usage = 0;
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    /// Whether the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    /// Summed weight of the cached entries.
    pub fn usage(&self) -> usize {
        self.usage
    }

    fn is_exceeded(&self) -> bool {
        (self.config.max_entries != 0 && self.len() > self.config.max_entries)
            || (self.config.max_bytes != 0 && self.usage > self.config.max_bytes)
    }

    fn notify(&self, event: Event, key: &str, value: &V) {
        if let Some(listener) = self.listener.as_ref() {
            listener.on_leave(event, key, value);
        }
    }

    fn detach(&mut self, token: Token) -> Option<Node<V>> {
        self.unlink(token);
        let node = self.slab.remove(token)?;
        self.index.remove(&node.key);
        self.usage -= node.weight;
        Some(node)
    }

    fn move_to_front(&mut self, token: Token) {
        if self.head == Some(token) {
            return;
        }
        self.unlink(token);
        self.link_front(token);
    }

    fn link_front(&mut self, token: Token) {
        let head = self.head;

        let node = &mut self.slab[token];
        node.prev = None;
        node.next = head;

        match head {
            Some(head) => self.slab[head].prev = Some(token),
            None => self.tail = Some(token),
        }
        self.head = Some(token);
    }

    fn unlink(&mut self, token: Token) {
        let node = &mut self.slab[token];
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(prev) => self.slab[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slab[next].prev = prev,
            None => self.tail = prev,
        }
    }
}
