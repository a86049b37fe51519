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

use ringcache::prelude::*;

struct EchoEventListener;

impl EventListener<ByteView> for EchoEventListener {
    fn on_leave(&self, reason: Event, key: &str, value: &ByteView) {
        println!("Entry [key = {key}] [value = {value}] left by {reason:?}.")
    }
}

/// Output:
///
/// ```plain
/// Entry [key = Jack] [value = 589] left by Evict.
/// Entry [key = Tom] [value = 630] left by Evict.
/// ```
fn main() -> anyhow::Result<()> {
    let scores = GroupBuilder::new("scores")
        .with_max_entries(2)
        .with_event_listener(Arc::new(EchoEventListener))
        .with_source(|key: &str| -> anyhow::Result<Vec<u8>> {
            match key {
                "Tom" => Ok(b"630".to_vec()),
                "Jack" => Ok(b"589".to_vec()),
                "Sam" => Ok(b"567".to_vec()),
                _ => Err(anyhow::anyhow!("{key} not exist")),
            }
        })
        .build()?;

    scores.get("Tom")?;
    scores.get("Jack")?;
    scores.get("Tom")?;
    scores.get("Sam")?;
    scores.get("Jack")?;

    Ok(())
}
