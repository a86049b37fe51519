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

//! ringcache is a distributed read-through cache for Rust.
//!
//! A process holds named [`Group`]s backed by a slow [`DataSource`]. Reads are served from a bounded local cache.
//! On a miss, concurrent reads of a key are coalesced into one load that either fetches the value from the node owning
//! the key on a consistent hash ring, or loads it from the data source and caches it locally.
//!
//! ```
//! use ringcache::prelude::*;
//!
//! let registry = GroupRegistry::new();
//! let scores = registry
//!     .new_group("scores", 2 << 10, |key: &str| -> anyhow::Result<Vec<u8>> {
//!         match key {
//!             "Tom" => Ok(b"630".to_vec()),
//!             _ => Err(anyhow::anyhow!("{key} not exist")),
//!         }
//!     })
//!     .unwrap();
//!
//! assert_eq!(scores.get("Tom").unwrap().to_string_lossy(), "630");
//! assert!(scores.get("Jack").is_err());
//! ```

pub use ringcache_common as common;
pub use ringcache_memory as memory;

/// Groups: the read-through orchestration.
pub mod group;
/// Peer transport over HTTP/1.
pub mod http;
/// Capability traits of remote nodes and their wire messages.
pub mod peer;
/// Process registry of groups.
pub mod registry;
/// Consistent hash ring.
pub mod ring;
/// Authoritative data sources.
pub mod source;

/// The re-exported items most applications need.
pub mod prelude;
pub use prelude::*;
