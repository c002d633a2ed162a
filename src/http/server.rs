//! HTTP server setup and the gateway handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all gateway handler
//! - Wire up middleware (tracing, request ID)
//! - Bound each forwarded request by the configured request timeout
//! - Answer preflight requests locally
//! - Forward everything else to the single backend and relay the answer
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header::ORIGIN, Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigError, GatewayConfig};
use crate::http::body::{attach_length, read_inbound};
use crate::http::error::GatewayError;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response::assemble;
use crate::observability::metrics;
use crate::routing::PathResolver;
use crate::security::headers::redacted;
use crate::security::{CorsPolicy, HeaderPolicy};
use crate::upstream::{BackendTarget, HttpUpstream, Upstream, UpstreamRequest};

/// Everything a request needs, built once at startup and never mutated.
pub struct Gateway {
    pub resolver: PathResolver,
    pub headers: HeaderPolicy,
    pub cors: CorsPolicy,
    pub upstream: Arc<dyn Upstream>,
    pub max_body_size: usize,
    pub request_timeout: Duration,
}

impl Gateway {
    pub fn new(config: &GatewayConfig, upstream: Arc<dyn Upstream>) -> Result<Self, ConfigError> {
        let target = BackendTarget::from_config(&config.backend)?;
        Ok(Self {
            resolver: PathResolver::new(&target, &config.route),
            headers: HeaderPolicy::from_config(&config.headers, &target),
            cors: CorsPolicy::from_config(&config.cors)?,
            upstream,
            max_body_size: config.listener.max_body_size,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// Failure to construct the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server forwarding through a real HTTP client.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let upstream = HttpUpstream::new(&config.timeouts);
        Ok(Self::with_upstream(config, Arc::new(upstream))?)
    }

    /// Create a server forwarding through the given dispatcher.
    pub fn with_upstream(
        config: GatewayConfig,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, ConfigError> {
        let gateway = Arc::new(Gateway::new(&config, upstream)?);
        let router = Self::build_router(AppState { gateway });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Gateway handler: preflight short-circuit, otherwise resolve, forward and relay.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let gateway = &state.gateway;
    let request_id = request_id(&request);
    let method = request.method().clone();
    let origin = request.headers().get(ORIGIN).cloned();

    if method == Method::OPTIONS {
        tracing::debug!(request_id = %request_id, path = %request.uri().path(), "Answering preflight");
        let response = gateway.cors.preflight(origin.as_ref());
        metrics::record_request(method.as_str(), response.status().as_u16(), "preflight", start_time);
        return response;
    }

    let forwarded = tokio::time::timeout(gateway.request_timeout, forward(gateway, &request_id, request))
        .await
        .unwrap_or_else(|_| {
            Err(GatewayError::Timeout {
                after: gateway.request_timeout,
            })
        });

    let (mut response, outcome) = match forwarded {
        Ok(response) => (response, "relayed"),
        Err(e) => {
            match &e {
                GatewayError::Upstream { target, .. } => {
                    tracing::error!(request_id = %request_id, target = %target, error = %e, "Upstream error")
                }
                _ => tracing::warn!(request_id = %request_id, error = %e, "Rejected request"),
            }
            let kind = e.kind();
            (e.into_response(), kind)
        }
    };

    gateway.cors.annotate(origin.as_ref(), response.headers_mut());
    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start_time);
    response
}

async fn forward(
    gateway: &Gateway,
    request_id: &str,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let target = gateway.resolver.resolve(request.uri())?;
    let (parts, body) = request.into_parts();
    let body = read_inbound(&parts.method, &parts.headers, body, gateway.max_body_size).await?;

    let mut headers = gateway.headers.upstream_headers(&parts.headers);
    attach_length(&gateway.headers, &mut headers, body.as_ref());

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        target = %target,
        body_bytes = body.as_ref().map_or(0, |b| b.len()),
        "Forwarding request"
    );
    tracing::trace!(
        request_id = %request_id,
        policy = ?gateway.headers.shape(),
        headers = ?redacted(&headers),
        "Upstream headers"
    );

    let started = Instant::now();
    let upstream = gateway
        .upstream
        .dispatch(UpstreamRequest {
            method: parts.method,
            uri: target,
            headers,
            body,
        })
        .await?;

    tracing::debug!(
        request_id = %request_id,
        status = %upstream.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Upstream responded"
    );
    Ok(assemble(upstream))
}
