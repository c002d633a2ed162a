//! Request-scoped failures and their diagnostic responses.
//!
//! # Responsibilities
//! - Classify failures (transport, malformed request, oversized body, deadline)
//! - Render the single gateway-originated body: JSON with message and target
//!
//! # Design Decisions
//! - Backend 4xx/5xx are not errors here; they are relayed as-is
//! - Messages come from the transport error chain with the URL stripped,
//!   never from header values

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure while handling one inbound request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend could not be reached or the exchange broke off.
    #[error("{message}")]
    Upstream { message: String, target: String },

    /// The inbound request cannot be forwarded (e.g. unbuildable target URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The inbound body is larger than the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The request did not complete within the configured request timeout.
    #[error("request timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },
}

impl GatewayError {
    /// Build an upstream failure from a transport error.
    pub fn upstream(err: &(dyn std::error::Error + 'static), target: impl Into<String>) -> Self {
        Self::Upstream {
            message: error_chain(err),
            target: target.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream { .. } => "upstream_error",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Join an error and its sources into one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let target = match &self {
            Self::Upstream { target, .. } => Some(target.as_str()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            target,
        };
        (status, Json(body)).into_response()
    }
}
