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

use ringcache::prelude::*;

fn main() -> anyhow::Result<()> {
    let registry = GroupRegistry::new();
    let scores = registry.new_group("scores", 2 << 10, |key: &str| -> anyhow::Result<Vec<u8>> {
        println!("[slow db] search key {key}");
        match key {
            "Tom" => Ok(b"630".to_vec()),
            "Jack" => Ok(b"589".to_vec()),
            "Sam" => Ok(b"567".to_vec()),
            _ => Err(anyhow::anyhow!("{key} not exist")),
        }
    })?;

    for key in ["Tom", "Jack", "Tom", "Sam", "Tom"] {
        println!("{key} => {}", scores.get(key)?);
    }
    if let Err(e) = scores.get("unknown") {
        println!("unknown => {e}");
    }

    println!("{:?}", scores.stats());
    Ok(())
}
