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

use std::{future::Future, pin::Pin, sync::Arc};

use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    header::CONTENT_TYPE,
    server::conn::http1,
    service::Service,
    Method, Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::{http::DEFAULT_BASE_PATH, peer, registry::GroupRegistry};

/// Serve the peer protocol for the groups of `registry` on `listener`.
///
/// | request                         | response                                  |
/// |---------------------------------|-------------------------------------------|
/// | `GET /_ringcache/<group>/<key>` | `200` with the encoded [`peer::Response`] |
/// | unknown group                   | `404`                                     |
/// | failed group get                | `500` with the error message              |
/// | other paths                     | `400`                                     |
/// | other methods                   | `405`                                     |
///
/// Runs until the task is dropped. Groups are queried on the blocking pool of the runtime.
pub async fn serve(listener: TcpListener, registry: Arc<GroupRegistry>) {
    let local = listener
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    tracing::info!("[http server]: serving peer protocol on {local}");

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(res) => res,
            Err(e) => {
                tracing::error!("[http server]: accept connection error: {e}");
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let handle = Handle {
            registry: registry.clone(),
        };

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new().serve_connection(io, handle).await {
                tracing::error!("[http server]: serve request error: {e}");
            }
        });
    }
}

struct Handle {
    registry: Arc<GroupRegistry>,
}

impl Service<Request<Incoming>> for Handle {
    type Response = Response<Full<Bytes>>;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let registry = self.registry.clone();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        Box::pin(async move {
            let (status, body) = if method != Method::GET {
                (StatusCode::METHOD_NOT_ALLOWED, Bytes::from("method not allowed"))
            } else {
                handle(&registry, &path).await
            };

            let content_type = if status == StatusCode::OK {
                "application/octet-stream"
            } else {
                "text/plain; charset=utf-8"
            };

            anyhow::Ok(
                Response::builder()
                    .status(status)
                    .header(CONTENT_TYPE, content_type)
                    .body(Full::new(body))?,
            )
        })
    }
}

/// Splits `<base path><group>/<key>` into the decoded group and key.
fn parse(path: &str) -> Option<(String, String)> {
    let (group, key) = path.strip_prefix(DEFAULT_BASE_PATH)?.split_once('/')?;
    let group = urlencoding::decode(group).ok()?.into_owned();
    let key = urlencoding::decode(key).ok()?.into_owned();
    Some((group, key))
}

async fn handle(registry: &GroupRegistry, path: &str) -> (StatusCode, Bytes) {
    let Some((name, key)) = parse(path) else {
        tracing::debug!("[http server]: bad request, path: {path}");
        return (StatusCode::BAD_REQUEST, Bytes::from(format!("bad request: {path}")));
    };

    let Some(group) = registry.get_group(&name) else {
        return (StatusCode::NOT_FOUND, Bytes::from(format!("no such group: {name}")));
    };

    let value = match tokio::task::spawn_blocking(move || group.get(&key)).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => return (StatusCode::INTERNAL_SERVER_ERROR, Bytes::from(e.to_string())),
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, Bytes::from(e.to_string())),
    };

    match (peer::Response { value: value.to_vec() }).encode() {
        Ok(buf) => (StatusCode::OK, Bytes::from(buf)),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Bytes::from(e.to_string())),
    }
}
