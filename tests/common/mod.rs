//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;

use edge_gateway::config::GatewayConfig;
use edge_gateway::http::GatewayError;
use edge_gateway::upstream::{Upstream, UpstreamRequest, UpstreamResponse};
use edge_gateway::{HttpServer, Shutdown};

/// What the recording upstream answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        body: Vec<u8>,
    },
    /// 200 with the request body echoed back.
    Echo,
    /// Transport failure with this message.
    Fail(&'static str),
    /// Sleep this long, then answer 200.
    Stall(Duration),
}

/// Upstream double that counts calls and keeps every request it saw.
pub struct RecordingUpstream {
    calls: AtomicUsize,
    requests: Mutex<Vec<UpstreamRequest>>,
    reply: Reply,
}

impl RecordingUpstream {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply,
        })
    }

    pub fn ok(body: &str) -> Arc<Self> {
        Self::new(Reply::Respond {
            status: StatusCode::OK,
            headers: vec![("content-type", "application/json")],
            body: body.as_bytes().to_vec(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> UpstreamRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no upstream request recorded")
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn dispatch(&self, request: UpstreamRequest) -> Result<UpstreamResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            Reply::Respond {
                status,
                headers,
                body,
            } => {
                let mut map = HeaderMap::new();
                for (name, value) in headers {
                    map.append(
                        HeaderName::from_static(*name),
                        HeaderValue::from_static(*value),
                    );
                }
                Ok(UpstreamResponse {
                    status: *status,
                    headers: map,
                    body: Body::from(body.clone()),
                })
            }
            Reply::Echo => Ok(UpstreamResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: request.body.map(Body::from).unwrap_or_else(Body::empty),
            }),
            Reply::Fail(message) => Err(GatewayError::Upstream {
                message: message.to_string(),
                target: request.uri.to_string(),
            }),
            Reply::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(UpstreamResponse {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    body: Body::empty(),
                })
            }
        }
    }
}

/// Config pointing at `https://backend.example` with one allowed origin.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backend.base_url = "https://backend.example".into();
    config.cors.allowed_origins = vec!["https://app.example".into()];
    config
}

/// Router wired to the given upstream double.
pub fn router(config: GatewayConfig, upstream: Arc<RecordingUpstream>) -> Router {
    HttpServer::with_upstream(config, upstream)
        .expect("valid test config")
        .router()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Start a backend that echoes the request body and reports what it received
/// in `x-echo-*` headers. When the request accepts zstd, the body is sent back
/// zstd-framed instead.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Frame header a zstd encoder would emit.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

async fn echo(request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let reported = |name: &str| -> HeaderValue {
        parts
            .headers
            .get(name)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("none"))
    };

    let zstd = parts
        .headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("zstd"));
    let payload = if zstd {
        [&ZSTD_MAGIC[..], &bytes[..]].concat()
    } else {
        bytes.to_vec()
    };

    let mut response = Response::new(Body::from(payload));
    let headers = response.headers_mut();
    headers.insert("x-echo-method", HeaderValue::from_str(parts.method.as_str()).unwrap());
    headers.insert(
        "x-echo-uri",
        HeaderValue::from_str(&parts.uri.to_string()).unwrap(),
    );
    headers.insert("x-echo-host", reported("host"));
    headers.insert("x-echo-authorization", reported("authorization"));
    headers.insert("x-echo-content-length", reported("content-length"));
    headers.insert("x-echo-user-agent", reported("user-agent"));
    headers.insert("x-echo-accept-encoding", reported("accept-encoding"));
    let encoding = if zstd { "zstd" } else { "identity" };
    headers.insert("content-encoding", HeaderValue::from_static(encoding));
    headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
    if parts.uri.path() == "/missing" {
        *response.status_mut() = StatusCode::NOT_FOUND;
    }
    response
}

/// Start the gateway on an ephemeral port. Returns its address and the shutdown handle.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// A loopback address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
