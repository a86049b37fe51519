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
use itertools::Itertools;
use ringcache_common::hasher::{crc32_ieee, ArcRingHasher};

/// Virtual positions per node when none are configured.
pub const DEFAULT_REPLICAS: usize = 50;

/// Consistent hash ring mapping keys to node identifiers.
///
/// Each node occupies `replicas` virtual positions: the hashes of `"{i}{id}"` for `i` in `0..replicas`. A key is owned
/// by the node at the first position clockwise from the hash of the key.
///
/// The ring has no interior locking, its owner serializes readers and writers.
pub struct ConsistentHash {
    replicas: usize,
    hasher: ArcRingHasher,

    /// Sorted, without duplicates.
    ring: Vec<u32>,
    nodes: HashMap<u32, String>,
}

impl Debug for ConsistentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistentHash")
            .field("replicas", &self.replicas)
            .field("positions", &self.ring.len())
            .field("nodes", &self.nodes())
            .finish()
    }
}

impl Default for ConsistentHash {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, Arc::new(crc32_ieee))
    }
}

impl ConsistentHash {
    /// Create an empty ring.
    ///
    /// `replicas == 0` falls back to [`DEFAULT_REPLICAS`].
    pub fn new(replicas: usize, hasher: ArcRingHasher) -> Self {
        let replicas = if replicas == 0 { DEFAULT_REPLICAS } else { replicas };
        Self {
            replicas,
            hasher,
            ring: vec![],
            nodes: HashMap::new(),
        }
    }

    /// Add nodes to the ring.
    ///
    /// Positions that collide with an existing position are owned by the node added last.
    pub fn add_nodes<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hasher)(format!("{i}{id}").as_bytes());
                self.ring.push(hash);
                self.nodes.insert(hash, id.to_string());
            }
        }
        self.ring.sort_unstable();
        self.ring.dedup();
    }

    /// Get the node owning `key`. `None` if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }

        let hash = (self.hasher)(key.as_bytes());
        let index = self.ring.partition_point(|&h| h < hash) % self.ring.len();
        self.nodes.get(&self.ring[index]).map(String::as_str)
    }

    /// Number of virtual positions.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the ring holds no node.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Virtual positions per node.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Distinct node identifiers, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        self.nodes.values().map(String::as_str).sorted().dedup().collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hashes decimal strings to their value.
    fn numeric() -> ArcRingHasher {
        Arc::new(|data: &[u8]| -> u32 {
            std::str::from_utf8(data)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default()
        })
    }

    #[test]
    fn test_ring_routing() {
        let mut ring = ConsistentHash::new(3, numeric());

        // 2, 4, 6, 12, 14, 16, 22, 24, 26
        ring.add_nodes(["6", "4", "2"]);
        assert_eq!(ring.len(), 9);
        assert_eq!(ring.nodes(), vec!["2", "4", "6"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, node) in cases {
            assert_eq!(ring.get(key), Some(node), "key: {key}");
        }

        // 8, 18, 28
        ring.add_nodes(["8"]);
        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "8")];
        for (key, node) in cases {
            assert_eq!(ring.get(key), Some(node), "key: {key}");
        }
    }

    #[test]
    fn test_ring_empty() {
        let ring = ConsistentHash::default();
        assert!(ring.is_empty());
        assert_eq!(ring.replicas(), DEFAULT_REPLICAS);
        assert_eq!(ring.get("Tom"), None);
        assert_eq!(ring.get(""), None);

        let ring = ConsistentHash::new(0, numeric());
        assert_eq!(ring.replicas(), DEFAULT_REPLICAS);
    }

    #[test]
    fn test_ring_duplicate_positions() {
        // Replica "11" of node "1" and replica "011" of node "11" collide on 11.
        let mut ring = ConsistentHash::new(2, numeric());
        ring.add_nodes(["1"]);
        ring.add_nodes(["11"]);

        // 1, 11, 111 with 11 taken over by the node added last.
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.get("5"), Some("11"));
        assert_eq!(ring.get("50"), Some("11"));
        assert_eq!(ring.get("0"), Some("1"));
    }

    #[test]
    fn test_ring_deterministic_and_stable() {
        let nodes = ["http://10.0.0.1:8001", "http://10.0.0.2:8001", "http://10.0.0.3:8001"];
        let keys = (0..10000).map(|i| format!("key-{i}")).collect_vec();

        let mut r1 = ConsistentHash::default();
        r1.add_nodes(nodes);
        let mut r2 = ConsistentHash::default();
        r2.add_nodes(nodes.iter().rev());

        let before = keys.iter().map(|key| r1.get(key).map(str::to_string)).collect_vec();
        for (key, node) in keys.iter().zip_eq(before.iter()) {
            assert_eq!(r2.get(key), node.as_deref());
        }

        // Every node owns a share of the keys.
        for node in nodes {
            assert!(before.iter().any(|n| n.as_deref() == Some(node)));
        }

        // Adding a node moves keys to the new node only.
        r1.add_nodes(["http://10.0.0.4:8001"]);
        let mut moved = 0;
        for (key, node) in keys.iter().zip_eq(before.iter()) {
            let now = r1.get(key);
            if now != node.as_deref() {
                assert_eq!(now, Some("http://10.0.0.4:8001"));
                moved += 1;
            }
        }
        assert!(moved > 0);
        assert!(moved < keys.len() / 2);
    }
}
