//! Response assembly.
//!
//! # Responsibilities
//! - Combine backend status, filtered headers and relayed body
//!
//! # Design Decisions
//! - Status is relayed verbatim; a backend 5xx stays a 5xx
//! - Framing headers are stripped because the body is re-framed here
//! - CORS annotation happens afterwards, for error responses too

use axum::response::Response;

use crate::security::headers::downstream_headers;
use crate::upstream::UpstreamResponse;

/// Turn a backend response into the client response.
pub fn assemble(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(upstream.body);
    *response.status_mut() = upstream.status;
    *response.headers_mut() = downstream_headers(&upstream.headers);
    response
}
