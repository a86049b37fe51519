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

//! Prometheus text exporter: `GET /metrics` answers the gathered metric families of the node.

use std::{future::Future, pin::Pin};

use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    header::CONTENT_TYPE,
    server::conn::http1,
    service::Service,
    Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use prometheus::{Registry, TextEncoder};
use tokio::net::TcpListener;

pub async fn serve(listener: TcpListener, registry: Registry) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::error!("[exporter]: accept connection error: {e}");
                continue;
            }
        };

        let exporter = Exporter {
            registry: registry.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), exporter)
                .await
            {
                tracing::error!("[exporter]: serve request error: {e}");
            }
        });
    }
}

struct Exporter {
    registry: Registry,
}

impl Service<Request<Incoming>> for Exporter {
    type Response = Response<Full<Bytes>>;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let families = (req.uri().path() == "/metrics").then(|| self.registry.gather());

        Box::pin(async move {
            let Some(families) = families else {
                return anyhow::Ok(
                    Response::builder()
                        .status(StatusCode::NOT_FOUND)
                        .body(Full::new(Bytes::from("not found")))?,
                );
            };

            let text = TextEncoder::new().encode_to_string(&families)?;
            anyhow::Ok(
                Response::builder()
                    .status(StatusCode::OK)
                    .header(CONTENT_TYPE, prometheus::TEXT_FORMAT)
                    .body(Full::new(Bytes::from(text)))?,
            )
        })
    }
}
