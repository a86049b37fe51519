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

/// The authoritative, slow data source behind a group.
///
/// Called on local cache misses of keys owned by the local node, and as the fallback when a remote node fails.
///
/// Closures with the signature `Fn(&str) -> anyhow::Result<Vec<u8>>` are data sources.
pub trait DataSource: Send + Sync + 'static {
    /// Load the value of `key`.
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> DataSource for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}
