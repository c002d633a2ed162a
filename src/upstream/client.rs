//! HTTP transport to the backend.
//!
//! Requests go out with the exact `http::Uri` the resolver built, so dot
//! segments and query encoding reach the backend untouched.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::TimeoutConfig;
use crate::http::body::relay_outbound;
use crate::http::error::GatewayError;
use crate::upstream::{Upstream, UpstreamRequest, UpstreamResponse};

/// hyper-based dispatcher speaking plain HTTP or TLS depending on the target scheme.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    timeout: Duration,
}

impl HttpUpstream {
    /// Build the client. Redirects are never followed; 3xx is relayed like any status.
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn dispatch(&self, request: UpstreamRequest) -> Result<UpstreamResponse, GatewayError> {
        let target = request.uri.to_string();

        let mut builder = Request::builder().method(request.method).uri(request.uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = request.headers;
        }
        let outbound = builder
            .body(request.body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let response = match tokio::time::timeout(self.timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(GatewayError::upstream(&e, target)),
            Err(_) => {
                return Err(GatewayError::Upstream {
                    message: format!("no response within {}s", self.timeout.as_secs()),
                    target,
                })
            }
        };

        let (parts, body) = response.into_parts();
        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body: relay_outbound(body),
        })
    }
}
