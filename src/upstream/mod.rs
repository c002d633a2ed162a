//! Upstream dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamRequest (method, target URL, filtered headers, optional body)
//!     → Upstream::dispatch (single shot, no retry)
//!     → UpstreamResponse (any status)  or  GatewayError::Upstream
//! ```
//!
//! # Design Decisions
//! - One call per inbound request; no retries, no failover
//! - A well-formed response of any status is a success at this layer
//! - The trait is the seam between the handler and the transport

pub mod client;
pub mod target;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};

use crate::http::error::GatewayError;

pub use client::HttpUpstream;
pub use target::BackendTarget;

/// Request prepared for the backend.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Exact target, never normalized.
    pub uri: Uri,
    pub headers: HeaderMap,
    /// `None` means no body at all, which is distinct from an empty payload.
    pub body: Option<Bytes>,
}

/// Response obtained from the backend.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Issues the forwarded request to the backend.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn dispatch(&self, request: UpstreamRequest) -> Result<UpstreamResponse, GatewayError>;
}
