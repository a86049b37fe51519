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

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{client::conn::http1, Method, StatusCode};
use hyper_util::rt::TokioIo;
use ringcache::prelude::*;
use tokio::{
    net::{TcpListener, TcpStream},
    runtime::Runtime,
};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

/// Serve `registry` on a loopback port, returns the node url.
fn start(runtime: &Runtime, registry: Arc<GroupRegistry>) -> String {
    let listener = runtime.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let addr = listener.local_addr().unwrap();
    runtime.spawn(serve(listener, registry));
    format!("http://{addr}")
}

/// Registers group "scores" whose source echoes the key, returns the load counter.
fn scores(registry: &GroupRegistry) -> (Arc<Group>, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let l = loads.clone();
    let group = registry
        .new_group("scores", 2 << 10, move |key: &str| -> anyhow::Result<Vec<u8>> {
            l.fetch_add(1, Ordering::SeqCst);
            match key {
                "unknown" => Err(anyhow::anyhow!("{key} not exist")),
                _ => Ok(format!("value-of-{key}").into_bytes()),
            }
        })
        .unwrap();
    (group, loads)
}

/// Send a raw request to the node at `url`, returns the status and the body.
async fn send(url: &str, method: Method, path: &str) -> (StatusCode, Bytes) {
    let addr = url.trim_start_matches("http://");
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    tokio::spawn(conn);

    let req = hyper::Request::builder()
        .method(method)
        .uri(path)
        .header(hyper::header::HOST, addr)
        .body(Empty::<Bytes>::new())
        .unwrap();
    let res = sender.send_request(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

/// A two-node cluster, returns node a, the loads of both nodes and a key owned by node b.
fn cluster(runtime: &Runtime) -> (Arc<Group>, Arc<AtomicUsize>, Arc<AtomicUsize>, String) {
    let ra = Arc::new(GroupRegistry::new());
    let rb = Arc::new(GroupRegistry::new());
    let (a, a_loads) = scores(&ra);
    let (b, b_loads) = scores(&rb);
    let a_url = start(runtime, ra);
    let b_url = start(runtime, rb);

    for (group, url) in [(&a, &a_url), (&b, &b_url)] {
        let pool = Arc::new(HttpPool::new(url, runtime.handle().clone()));
        pool.set_nodes([&a_url, &b_url]);
        group.register_picker(pool);
    }

    let pool = HttpPool::new(&a_url, runtime.handle().clone());
    pool.set_nodes([&a_url, &b_url]);
    let remote = (0..1000)
        .map(|i| format!("key-{i}"))
        .find(|key| pool.pick_node(key).is_some())
        .unwrap();

    (a, a_loads, b_loads, remote)
}

fn request(group: &str, key: &str) -> Request {
    Request {
        group: group.to_string(),
        key: key.to_string(),
    }
}

#[test_log::test]
fn test_http_getter_roundtrip() {
    let runtime = runtime();
    let registry = Arc::new(GroupRegistry::new());
    let (_, loads) = scores(&registry);
    let url = start(&runtime, registry);

    let getter = HttpGetter::new(format!("{url}{DEFAULT_BASE_PATH}"), runtime.handle().clone());

    let response = getter.get(&request("scores", "Tom")).unwrap();
    assert_eq!(response.value, b"value-of-Tom");

    // Keys are escaped on the wire.
    let response = getter.get(&request("scores", "Tom Sawyer/1")).unwrap();
    assert_eq!(response.value, b"value-of-Tom Sawyer/1");
    assert_eq!(loads.load(Ordering::SeqCst), 2);

    let e = getter.get(&request("names", "Tom")).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Peer);

    let e = getter.get(&request("scores", "unknown")).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Peer);
}

#[test_log::test]
fn test_two_nodes() {
    let runtime = runtime();

    let ra = Arc::new(GroupRegistry::new());
    let rb = Arc::new(GroupRegistry::new());
    let (a, a_loads) = scores(&ra);
    let (b, b_loads) = scores(&rb);
    let a_url = start(&runtime, ra);
    let b_url = start(&runtime, rb);

    for (group, url) in [(&a, &a_url), (&b, &b_url)] {
        let pool = Arc::new(HttpPool::new(url, runtime.handle().clone()));
        pool.set_nodes([&a_url, &b_url]);
        group.register_picker(pool);
    }

    let pool = HttpPool::new(&a_url, runtime.handle().clone());
    pool.set_nodes([&a_url, &b_url]);
    let remote = (0..1000)
        .map(|i| format!("key-{i}"))
        .find(|key| pool.pick_node(key).is_some())
        .unwrap();
    let local = (0..1000)
        .map(|i| format!("key-{i}"))
        .find(|key| pool.pick_node(key).is_none())
        .unwrap();

    // Owned by node b: loaded and cached there only.
    assert_eq!(a.get(&remote).unwrap().to_string_lossy(), format!("value-of-{remote}"));
    assert_eq!(a_loads.load(Ordering::SeqCst), 0);
    assert_eq!(b_loads.load(Ordering::SeqCst), 1);
    assert_eq!(a.usage(), 0);
    assert!(b.usage() > 0);

    // Served from the cache of node b.
    assert_eq!(a.get(&remote).unwrap().to_string_lossy(), format!("value-of-{remote}"));
    assert_eq!(b_loads.load(Ordering::SeqCst), 1);
    assert_eq!(b.stats().hits, 1);

    // Owned by node a.
    assert_eq!(a.get(&local).unwrap().to_string_lossy(), format!("value-of-{local}"));
    assert_eq!(a_loads.load(Ordering::SeqCst), 1);
    assert_eq!(b_loads.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn test_dead_peer_falls_back_to_source() {
    let runtime = runtime();

    let registry = Arc::new(GroupRegistry::new());
    let (group, loads) = scores(&registry);
    let url = start(&runtime, registry);

    // Nobody listens on the port of the dropped listener.
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let pool = Arc::new(HttpPool::new(&url, runtime.handle().clone()).with_timeout(Duration::from_secs(1)));
    pool.set_nodes([&url, &dead]);
    let key = (0..1000)
        .map(|i| format!("key-{i}"))
        .find(|key| pool.pick_node(key).is_some())
        .unwrap();
    group.register_picker(pool);

    assert_eq!(group.get(&key).unwrap().to_string_lossy(), format!("value-of-{key}"));
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    // Cached locally after the fallback.
    assert_eq!(group.get(&key).unwrap().to_string_lossy(), format!("value-of-{key}"));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(group.stats().hits, 1);
}

#[test_log::test]
fn test_get_from_runtime_worker() {
    let runtime = runtime();
    let (a, a_loads, b_loads, remote) = cluster(&runtime);

    let value = runtime
        .block_on(runtime.spawn({
            let remote = remote.clone();
            async move { a.get(&remote) }
        }))
        .unwrap()
        .unwrap();

    assert_eq!(value.to_string_lossy(), format!("value-of-{remote}"));
    assert_eq!(a_loads.load(Ordering::SeqCst), 0);
    assert_eq!(b_loads.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn test_get_from_current_thread_runtime_falls_back_to_source() {
    let runtime = runtime();
    let (a, a_loads, b_loads, remote) = cluster(&runtime);

    let local = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let value = local.block_on(async { a.get(&remote) }).unwrap();

    assert_eq!(value.to_string_lossy(), format!("value-of-{remote}"));
    assert_eq!(a_loads.load(Ordering::SeqCst), 1);
    assert_eq!(b_loads.load(Ordering::SeqCst), 0);
}

#[test_log::test]
fn test_server_status() {
    let runtime = runtime();
    let registry = Arc::new(GroupRegistry::new());
    scores(&registry);
    let url = start(&runtime, registry);

    runtime.block_on(async {
        let (status, body) = send(&url, Method::GET, "/_ringcache/scores/Tom").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(Response::decode(&body).unwrap().value, b"value-of-Tom");

        let (status, _) = send(&url, Method::GET, "/api/scores/Tom").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&url, Method::GET, "/_ringcache/scores").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&url, Method::POST, "/_ringcache/scores/Tom").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, body) = send(&url, Method::GET, "/_ringcache/names/Tom").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "no such group: names");

        let (status, body) = send(&url, Method::GET, "/_ringcache/scores/unknown").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8_lossy(&body).contains("unknown not exist"));
    });

    // The getter reports the status of a failed request.
    let getter = HttpGetter::new(format!("{url}{DEFAULT_BASE_PATH}"), runtime.handle().clone());
    let e = getter.get(&request("names", "Tom")).unwrap_err();
    let source = e.downcast_ref::<Error>().unwrap();
    assert!(
        source.context().iter().any(|(k, v)| *k == "status" && v == "404 Not Found"),
        "{e}"
    );
}
