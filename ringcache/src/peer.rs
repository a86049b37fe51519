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

use std::sync::Arc;

use ringcache_common::error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

/// Request for the value of `key` in group `group` on a remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Group name.
    pub group: String,
    /// Key.
    pub key: String,
}

/// Value served by a remote node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Raw value bytes.
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

impl Response {
    /// Encode the response for the wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| Error::new(ErrorKind::Codec, "encode response failed").with_source(e))
    }

    /// Decode a response from the wire.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        bincode::deserialize(buf)
            .map_err(|e| Error::new(ErrorKind::Codec, "decode response failed").with_source(e))
    }
}

/// Fetches values from one remote node.
pub trait PeerGetter: Send + Sync + 'static {
    /// Fetch the value of `request.key` in group `request.group`.
    fn get(&self, request: &Request) -> Result<Response>;
}

/// Chooses the node owning a key.
pub trait PeerPicker: Send + Sync + 'static {
    /// Get the getter of the remote node owning `key`.
    ///
    /// Returns `None` if the key is owned by the local node or no remote node is known, the key is then loaded
    /// locally.
    fn pick_node(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
