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

//! The slow database behind the demo group.

use anyhow::anyhow;

const SCORES: &[(&str, &str)] = &[("Tom", "630"), ("Jack", "589"), ("Sam", "567")];

pub fn load(key: &str) -> anyhow::Result<Vec<u8>> {
    tracing::info!("[slow db]: search key {key}");
    SCORES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_bytes().to_vec())
        .ok_or_else(|| anyhow!("{key} not exist"))
}
