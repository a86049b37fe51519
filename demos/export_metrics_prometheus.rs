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

use prometheus::{Registry, TextEncoder};
use ringcache::prelude::*;

fn main() -> anyhow::Result<()> {
    let prometheus = Registry::new();
    let registry = GroupRegistry::new();

    let scores = registry.register(
        GroupBuilder::new("scores")
            .with_capacity(2 << 10)
            .with_metrics_registry(Box::new(PrometheusMetricsRegistry::new(prometheus.clone())))
            .with_source(|key: &str| -> anyhow::Result<Vec<u8>> { Ok(key.as_bytes().to_vec()) }),
    )?;

    for key in ["Tom", "Jack", "Tom", "Tom"] {
        scores.get(key)?;
    }

    print!("{}", TextEncoder::new().encode_to_string(&prometheus.gather())?);
    Ok(())
}
