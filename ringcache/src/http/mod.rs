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

//! Peer transport over HTTP/1.
//!
//! A node serves `GET {base path}{group}/{key}` with the value encoded as a [`Response`](crate::peer::Response).
//! Group and key are percent-encoded path segments.

use std::time::Duration;

/// Path prefix of the peer protocol.
pub const DEFAULT_BASE_PATH: &str = "/_ringcache/";

/// Deadline of a remote fetch when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

mod getter;
mod pool;
mod server;

pub use getter::HttpGetter;
pub use pool::HttpPool;
pub use server::serve;
