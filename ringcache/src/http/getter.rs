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

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{client::conn::http1, header::HOST, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use ringcache_common::error::{Error, ErrorKind, Result};
use tokio::{
    net::TcpStream,
    runtime::{Handle, RuntimeFlavor},
};

use crate::{
    http::DEFAULT_TIMEOUT,
    peer::{PeerGetter, Request, Response},
};

/// Fetches values from one remote node over HTTP/1.
///
/// [`PeerGetter::get`] blocks the calling thread on `handle` until the response arrives or the timeout expires.
///
/// On a worker of a multi-thread runtime the wait runs in [`tokio::task::block_in_place`]. Inside a current-thread
/// runtime the fetch is refused with [`ErrorKind::Peer`], the group then loads the key from its data source.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    handle: Handle,
    timeout: Duration,
}

impl HttpGetter {
    /// Create a getter for the node serving the peer protocol under `base_url`, e.g.
    /// `http://127.0.0.1:8001/_ringcache/`.
    ///
    /// `handle` must belong to a runtime with I/O and time drivers enabled.
    pub fn new(base_url: impl Into<String>, handle: Handle) -> Self {
        Self {
            base_url: base_url.into(),
            handle,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the deadline of a fetch, connection included.
    ///
    /// Default: [`DEFAULT_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, request: &Request) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key)
        )
    }
}

impl PeerGetter for HttpGetter {
    fn get(&self, request: &Request) -> Result<Response> {
        let url = self.url(request);
        let request = async { tokio::time::timeout(self.timeout, fetch(&url)).await };

        let res = match Handle::try_current().map(|current| current.runtime_flavor()) {
            Err(_) => self.handle.block_on(request),
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| self.handle.block_on(request)),
            Ok(flavor) => {
                return Err(Error::peer("cannot block inside the runtime")
                    .with_context("url", &url)
                    .with_context("flavor", format!("{flavor:?}")))
            }
        };

        match res {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(Error::peer("fetch from peer failed")
                .with_context("url", &url)
                .with_source(e)),
            Err(_) => Err(Error::peer("fetch from peer timed out")
                .with_context("url", &url)
                .with_context("timeout", format!("{:?}", self.timeout))),
        }
    }
}

async fn fetch(url: &str) -> Result<Response> {
    let uri: Uri = url
        .parse()
        .map_err(|e| Error::new(ErrorKind::InvalidRequest, "invalid url").with_source(e))?;
    let authority = uri
        .authority()
        .cloned()
        .ok_or_else(|| Error::new(ErrorKind::InvalidRequest, "url without authority"))?;
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    let stream = TcpStream::connect((authority.host(), authority.port_u16().unwrap_or(80))).await?;
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| Error::new(ErrorKind::Io, "http handshake failed").with_source(e))?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("[http getter]: connection closed with error: {e}");
        }
    });

    let req = hyper::Request::builder()
        .uri(path)
        .header(HOST, authority.as_str())
        .body(Empty::<Bytes>::new())
        .map_err(|e| Error::new(ErrorKind::InvalidRequest, "build request failed").with_source(e))?;
    let res = sender
        .send_request(req)
        .await
        .map_err(|e| Error::new(ErrorKind::Io, "send request failed").with_source(e))?;

    let status = res.status();
    let body = res
        .into_body()
        .collect()
        .await
        .map_err(|e| Error::new(ErrorKind::Io, "read response body failed").with_source(e))?
        .to_bytes();

    if status != StatusCode::OK {
        return Err(Error::peer("peer responded with error")
            .with_context("status", status)
            .with_context("body", String::from_utf8_lossy(&body)));
    }

    Response::decode(&body)
}
