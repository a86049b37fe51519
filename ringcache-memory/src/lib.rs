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

//! Local cache components of ringcache.
//!
//! - [`Lru`]: bounded key-value store with least-recently-used eviction, limited by bytes and/or entries.
//! - [`Cache`]: thread-safe, lazily built wrapper of [`Lru`] with hit and eviction counters.
//! - [`Coalescer`]: deduplicates concurrent recoveries of the same key.

mod cache;
mod eviction;
mod inflight;
mod slab;

mod prelude;
pub use prelude::*;
