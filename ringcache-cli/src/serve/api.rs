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

//! Front-end API: `GET /api?key=<key>` answers the raw value of `key` in the demo group.

use std::{future::Future, pin::Pin, sync::Arc};

use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    header::CONTENT_TYPE,
    server::conn::http1,
    service::Service,
    Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use ringcache::{ErrorKind, Group};
use tokio::net::TcpListener;

pub async fn serve(listener: TcpListener, group: Arc<Group>) {
    loop {
        let (stream, _) = match listener.accept().await {
            Ok(res) => res,
            Err(e) => {
                tracing::error!("[api]: accept connection error: {e}");
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let handle = Handle { group: group.clone() };

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new().serve_connection(io, handle).await {
                tracing::error!("[api]: serve request error: {e}");
            }
        });
    }
}

struct Handle {
    group: Arc<Group>,
}

impl Service<Request<Incoming>> for Handle {
    type Response = Response<Full<Bytes>>;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let group = self.group.clone();
        let path = req.uri().path().to_string();
        let key = req.uri().query().and_then(query_key);

        Box::pin(async move {
            let (status, content_type, body) = match (path.as_str(), key) {
                ("/api", Some(key)) => match tokio::task::spawn_blocking(move || group.get(&key)).await? {
                    Ok(value) => (
                        StatusCode::OK,
                        "application/octet-stream",
                        Bytes::copy_from_slice(value.as_slice()),
                    ),
                    Err(e) if e.kind() == ErrorKind::InvalidRequest => (
                        StatusCode::BAD_REQUEST,
                        "text/plain; charset=utf-8",
                        Bytes::from(e.to_string()),
                    ),
                    Err(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "text/plain; charset=utf-8",
                        Bytes::from(e.to_string()),
                    ),
                },
                ("/api", None) => (
                    StatusCode::BAD_REQUEST,
                    "text/plain; charset=utf-8",
                    Bytes::from("key is required"),
                ),
                _ => (StatusCode::NOT_FOUND, "text/plain; charset=utf-8", Bytes::from("not found")),
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

/// Decoded value of the `key` query parameter.
fn query_key(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "key")
        .and_then(|(_, value)| urlencoding::decode(&value.replace('+', " ")).ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use http_body_util::{BodyExt, Empty};
    use hyper::client::conn;
    use ringcache::GroupBuilder;
    use tokio::net::TcpStream;

    use super::*;
    use crate::serve::db;

    async fn send(addr: &str, path: &str) -> (StatusCode, Bytes) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, connection) = conn::http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(connection);

        let req = Request::builder()
            .uri(path)
            .header(hyper::header::HOST, addr)
            .body(Empty::<Bytes>::new())
            .unwrap();
        let res = sender.send_request(req).await.unwrap();
        let status = res.status();
        (status, res.into_body().collect().await.unwrap().to_bytes())
    }

    #[test_log::test(tokio::test(flavor = "multi_thread"))]
    async fn test_api_status() {
        let group = Arc::new(GroupBuilder::new("scores").with_source(db::load).build().unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(serve(listener, group));

        let (status, body) = send(&addr, "/api?key=Tom").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "630");

        let (status, _) = send(&addr, "/api").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&addr, "/api?key=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&addr, "/api?key=unknown").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8_lossy(&body).contains("unknown not exist"));

        let (status, _) = send(&addr, "/scores?key=Tom").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_query_key() {
        assert_eq!(query_key("key=Tom"), Some("Tom".to_string()));
        assert_eq!(query_key("a=1&key=Tom%20Sawyer"), Some("Tom Sawyer".to_string()));
        assert_eq!(query_key("key=Tom+Sawyer"), Some("Tom Sawyer".to_string()));
        assert_eq!(query_key("key="), Some(String::new()));
        assert_eq!(query_key("name=Tom"), None);
    }
}
