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

//! Three nodes in one process, talking over loopback HTTP.

use std::sync::Arc;

use ringcache::prelude::*;
use tokio::net::TcpListener;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let mut listeners = vec![];
    for _ in 0..3 {
        listeners.push(runtime.block_on(TcpListener::bind("127.0.0.1:0"))?);
    }
    let nodes = listeners
        .iter()
        .map(|listener| Ok(format!("http://{}", listener.local_addr()?)))
        .collect::<std::io::Result<Vec<_>>>()?;

    let mut groups = vec![];
    for (listener, node) in listeners.into_iter().zip(nodes.iter()) {
        let registry = Arc::new(GroupRegistry::new());
        let name = node.clone();
        let group = registry.new_group("scores", 2 << 10, move |key: &str| -> anyhow::Result<Vec<u8>> {
            println!("[{name}] load {key} from source");
            Ok(format!("score of {key}").into_bytes())
        })?;

        let pool = HttpPool::new(node, runtime.handle().clone());
        pool.set_nodes(&nodes);
        group.register_picker(Arc::new(pool));

        runtime.spawn(serve(listener, registry));
        groups.push(group);
    }

    // Every key is loaded once, by its owner, whichever node is asked.
    for key in ["Tom", "Jack", "Sam"] {
        for (group, node) in groups.iter().zip(nodes.iter()) {
            println!("[{node}] {key} => {}", group.get(key)?);
        }
    }

    Ok(())
}
