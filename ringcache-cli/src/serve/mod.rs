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

mod api;
mod db;
mod exporter;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use bytesize::ByteSize;
use clap::Args;
use ringcache::prelude::*;
use tokio::{net::TcpListener, runtime::Handle};

use crate::error::{Error, Result};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host the peer protocol listens on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port the peer protocol listens on.
    #[arg(short, long, default_value_t = 8001)]
    port: u16,

    /// Urls of every node of the cluster, e.g. `http://127.0.0.1:8001,http://127.0.0.1:8002`.
    ///
    /// The local node is added if missing.
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Address of the front-end API, e.g. `127.0.0.1:9999`. Disabled if not set.
    #[arg(long)]
    api: Option<SocketAddr>,

    /// Byte limit of the local cache of group "scores".
    #[arg(long, default_value = "2KiB")]
    capacity: ByteSize,

    /// Entry limit of the local cache of group "scores". `0` means unbounded.
    #[arg(long, default_value_t = 0)]
    max_entries: usize,

    /// Deadline of a fetch from a remote node.
    #[arg(long, default_value = "3s", value_parser = humantime::parse_duration)]
    peer_timeout: Duration,

    /// Virtual positions of each node on the hash ring.
    #[arg(long, default_value_t = DEFAULT_REPLICAS)]
    replicas: usize,

    /// Address of the Prometheus exporter, e.g. `127.0.0.1:19970`. Disabled if not set.
    #[arg(long)]
    metrics: Option<SocketAddr>,
}

impl ServeArgs {
    fn self_addr(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Cluster nodes, the local node included.
    fn nodes(&self) -> Vec<String> {
        let self_addr = self.self_addr();
        let mut nodes = self
            .peers
            .iter()
            .map(|peer| peer.trim().trim_end_matches('/').to_string())
            .filter(|peer| !peer.is_empty())
            .collect::<Vec<_>>();
        if !nodes.contains(&self_addr) {
            nodes.push(self_addr);
        }
        nodes
    }

    fn validate(&self) -> Result<()> {
        if let Some(peer) = self.nodes().iter().find(|peer| !peer.starts_with("http://")) {
            return Err(Error::InvalidArgument(format!("peer url must start with \"http://\": {peer}")));
        }
        Ok(())
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    tracing::info!("[serve]: {args:?}");
    args.validate()?;

    let registry = GroupRegistry::global();

    let prometheus = prometheus::Registry::new();
    let mut builder = GroupBuilder::new("scores")
        .with_capacity(args.capacity.as_u64() as usize)
        .with_max_entries(args.max_entries)
        .with_source(db::load);
    if args.metrics.is_some() {
        builder = builder.with_metrics_registry(Box::new(PrometheusMetricsRegistry::new(prometheus.clone())));
    }
    let group = registry.register(builder)?;

    let pool = HttpPool::new(args.self_addr(), Handle::current())
        .with_timeout(args.peer_timeout)
        .with_replicas(args.replicas);
    pool.set_nodes(args.nodes());
    group.register_picker(Arc::new(pool));

    if let Some(addr) = args.metrics {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("[serve]: prometheus exporter listening on {addr}");
        tokio::spawn(exporter::serve(listener, prometheus));
    }

    if let Some(addr) = args.api {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("[serve]: front-end api listening on {addr}");
        tokio::spawn(api::serve(listener, group.clone()));
    }

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    tokio::select! {
        _ = ringcache::serve(listener, registry) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("[serve]: shutting down");
        }
    }

    Ok(())
}
