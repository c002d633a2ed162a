//! Header mediation between client and backend.
//!
//! # Responsibilities
//! - Build the header set sent upstream (allow-list or deny-list shape)
//! - Build the header set returned downstream (framing headers removed)
//! - Render header sets for logs with credentials redacted
//!
//! # Design Decisions
//! - Shape is fixed at startup, never chosen per request
//! - Authorization is forwarded under both shapes
//! - Deny-list shape rewrites Host to the backend's own authority
//! - Both shapes pin `Accept-Encoding: identity`; Content-Encoding is never relayed

use axum::http::header::{
    HeaderName, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_TYPE, COOKIE, HOST, PROXY_AUTHORIZATION, TRANSFER_ENCODING, USER_AGENT,
};
use axum::http::{HeaderMap, HeaderValue};

use crate::config::{HeaderPolicyConfig, HeaderPolicyShape};
use crate::upstream::BackendTarget;

/// Never copied from the backend response to the client.
pub const OUTBOUND_DENY: [HeaderName; 4] = [
    CONTENT_ENCODING,
    TRANSFER_ENCODING,
    CONNECTION,
    HeaderName::from_static("keep-alive"),
];

/// Never copied from the client to the backend under the deny-list shape.
pub const INBOUND_DENY: [HeaderName; 6] = [
    HOST,
    CONTENT_LENGTH,
    CONNECTION,
    TRANSFER_ENCODING,
    ACCEPT_ENCODING,
    HeaderName::from_static("keep-alive"),
];

const SENSITIVE: [HeaderName; 3] = [AUTHORIZATION, PROXY_AUTHORIZATION, COOKIE];

/// Active header policy, resolved from config at startup.
#[derive(Debug, Clone)]
pub enum HeaderPolicy {
    /// Fixed allow-list with defaults substituted for missing headers.
    AllowList { user_agent: HeaderValue },
    /// Copy everything except [`INBOUND_DENY`]; Host becomes `backend_host`.
    DenyList { backend_host: HeaderValue },
}

impl HeaderPolicy {
    pub fn from_config(config: &HeaderPolicyConfig, target: &BackendTarget) -> Self {
        match config.shape {
            HeaderPolicyShape::AllowList => Self::AllowList {
                user_agent: HeaderValue::from_str(&config.user_agent)
                    .unwrap_or_else(|_| HeaderValue::from_static("edge-gateway")),
            },
            HeaderPolicyShape::DenyList => Self::DenyList {
                backend_host: target.host_header().clone(),
            },
        }
    }

    pub fn shape(&self) -> HeaderPolicyShape {
        match self {
            Self::AllowList { .. } => HeaderPolicyShape::AllowList,
            Self::DenyList { .. } => HeaderPolicyShape::DenyList,
        }
    }

    /// Headers sent to the backend. Length framing is left to the body relay.
    pub fn upstream_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        match self {
            Self::AllowList { user_agent } => {
                let mut headers = HeaderMap::with_capacity(5);
                headers.insert(
                    CONTENT_TYPE,
                    first_or(inbound, &CONTENT_TYPE, HeaderValue::from_static("application/json")),
                );
                headers.insert(ACCEPT, first_or(inbound, &ACCEPT, HeaderValue::from_static("*/*")));
                headers.insert(USER_AGENT, first_or(inbound, &USER_AGENT, user_agent.clone()));
                if let Some(auth) = inbound.get(AUTHORIZATION) {
                    headers.insert(AUTHORIZATION, auth.clone());
                }
                headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
                headers
            }
            Self::DenyList { backend_host } => {
                let mut headers = HeaderMap::with_capacity(inbound.len());
                for (name, value) in inbound {
                    if !INBOUND_DENY.contains(name) {
                        headers.append(name.clone(), value.clone());
                    }
                }
                headers.insert(HOST, backend_host.clone());
                headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
                headers
            }
        }
    }
}

fn first_or(headers: &HeaderMap, name: &HeaderName, default: HeaderValue) -> HeaderValue {
    headers.get(name).cloned().unwrap_or(default)
}

/// Headers returned to the client: everything except [`OUTBOUND_DENY`].
pub fn downstream_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !OUTBOUND_DENY.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Header list safe for diagnostics: credential values become `[redacted]`.
pub fn redacted(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if SENSITIVE.contains(name) {
                "[redacted]".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}
