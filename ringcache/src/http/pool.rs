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

use std::{fmt::Debug, sync::Arc, time::Duration};

use hashbrown::HashMap;
use itertools::Itertools;
use parking_lot::RwLock;
use ringcache_common::hasher::crc32_ieee;
use tokio::runtime::Handle;

use crate::{
    http::{HttpGetter, DEFAULT_BASE_PATH, DEFAULT_TIMEOUT},
    peer::{PeerGetter, PeerPicker},
    ring::{ConsistentHash, DEFAULT_REPLICAS},
};

#[derive(Debug, Default)]
struct Peers {
    ring: ConsistentHash,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// Picks the owner of a key among a set of HTTP nodes.
///
/// Nodes are identified by their base urls, e.g. `http://127.0.0.1:8001`. The local node must be part of the node set
/// under the same url as `self_addr`, keys it owns are loaded locally.
pub struct HttpPool {
    self_addr: String,
    handle: Handle,
    timeout: Duration,
    replicas: usize,

    peers: RwLock<Peers>,
}

impl Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("self_addr", &self.self_addr)
            .field("timeout", &self.timeout)
            .field("peers", &self.peers.read().ring)
            .finish()
    }
}

impl HttpPool {
    /// Create a pool for the local node reachable at `self_addr`. The node set is empty until
    /// [`HttpPool::set_nodes`].
    ///
    /// Remote fetches run on `handle`.
    pub fn new(self_addr: impl AsRef<str>, handle: Handle) -> Self {
        Self {
            self_addr: normalize(self_addr.as_ref()),
            handle,
            timeout: DEFAULT_TIMEOUT,
            replicas: DEFAULT_REPLICAS,
            peers: RwLock::new(Peers::default()),
        }
    }

    /// Set the deadline of a remote fetch.
    ///
    /// Default: [`DEFAULT_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the virtual positions per node on the ring.
    ///
    /// Default: [`DEFAULT_REPLICAS`].
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Url of the local node.
    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    /// Replace the node set and rebuild the ring.
    pub fn set_nodes<I, S>(&self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let nodes = nodes.into_iter().map(|node| normalize(node.as_ref())).unique().collect_vec();

        let mut ring = ConsistentHash::new(self.replicas, Arc::new(crc32_ieee));
        ring.add_nodes(&nodes);

        let getters = nodes
            .iter()
            .map(|node| {
                let getter = HttpGetter::new(format!("{node}{DEFAULT_BASE_PATH}"), self.handle.clone())
                    .with_timeout(self.timeout);
                (node.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.write() = Peers { ring, getters };
        tracing::info!("[http pool]: {} set nodes: {nodes:?}", self.self_addr);
    }

    /// Urls of the nodes, sorted.
    pub fn nodes(&self) -> Vec<String> {
        self.peers.read().getters.keys().cloned().sorted().collect_vec()
    }
}

impl PeerPicker for HttpPool {
    fn pick_node(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.read();
        let node = peers.ring.get(key)?;
        if node == self.self_addr {
            return None;
        }
        tracing::debug!("[http pool]: {} pick node {node} for key {key}", self.self_addr);
        let getter: Arc<dyn PeerGetter> = peers.getters.get(node)?.clone();
        Some(getter)
    }
}

fn normalize(addr: &str) -> String {
    addr.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_pick() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let nodes = ["http://127.0.0.1:8001", "http://127.0.0.1:8002/", "http://127.0.0.1:8003"];

        let pool = HttpPool::new("http://127.0.0.1:8001", runtime.handle().clone());
        assert!(pool.pick_node("Tom").is_none());

        pool.set_nodes(nodes);
        assert_eq!(
            pool.nodes(),
            vec!["http://127.0.0.1:8001", "http://127.0.0.1:8002", "http://127.0.0.1:8003"]
        );

        let mut ring = ConsistentHash::default();
        ring.add_nodes(pool.nodes());

        let mut local = 0;
        let mut remote = 0;
        for i in 0..1000 {
            let key = format!("key-{i}");
            match (ring.get(&key), pool.pick_node(&key)) {
                (Some("http://127.0.0.1:8001"), None) => local += 1,
                (Some(owner), Some(_)) => {
                    assert_ne!(owner, "http://127.0.0.1:8001");
                    remote += 1;
                }
                (owner, picked) => panic!("key: {key}, owner: {owner:?}, picked: {}", picked.is_some()),
            }
        }
        assert!(local > 0);
        assert!(remote > 0);
    }

    #[test]
    fn test_pool_single_node() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let pool = HttpPool::new("http://127.0.0.1:8001/", runtime.handle().clone());
        assert_eq!(pool.self_addr(), "http://127.0.0.1:8001");

        pool.set_nodes(["http://127.0.0.1:8001"]);
        for i in 0..100 {
            assert!(pool.pick_node(&format!("key-{i}")).is_none());
        }
    }
}
