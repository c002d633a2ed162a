//! Body relay.
//!
//! # Responsibilities
//! - Capture the inbound body as exact bytes (never for GET/HEAD)
//! - Attach a length header when the allow-list policy requires it
//! - Stream the backend body back without buffering
//!
//! # Design Decisions
//! - Bodies are opaque; nothing here looks at their content
//! - An empty inbound body is forwarded as no body at all
//! - Inbound bodies are buffered so their exact length is known

use axum::body::{to_bytes, Body, Bytes};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, HeaderValue, Method};
use http_body_util::LengthLimitError;
use hyper::body::Incoming;

use crate::http::error::GatewayError;
use crate::security::HeaderPolicy;

/// GET and HEAD never carry a forwarded body.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Read the inbound body, bounded by `limit` bytes.
///
/// Returns `None` for bodiless methods and for empty bodies.
pub async fn read_inbound(
    method: &Method,
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Option<Bytes>, GatewayError> {
    if !carries_body(method) {
        return Ok(None);
    }

    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit as u64) {
        return Err(GatewayError::PayloadTooLarge { limit });
    }

    let bytes = match to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) if exceeded_limit(&e) => return Err(GatewayError::PayloadTooLarge { limit }),
        Err(e) => {
            return Err(GatewayError::InvalidRequest(format!(
                "failed to read request body: {}",
                e
            )))
        }
    };

    Ok((!bytes.is_empty()).then_some(bytes))
}

/// An undeclared (chunked) body ran past the limit while being read.
fn exceeded_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Set `Content-Length` for a non-empty body under the allow-list shape.
pub fn attach_length(policy: &HeaderPolicy, headers: &mut HeaderMap, body: Option<&Bytes>) {
    if let (HeaderPolicy::AllowList { .. }, Some(body)) = (policy, body) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
}

/// Relay the backend body frame by frame.
pub fn relay_outbound(body: Incoming) -> Body {
    Body::new(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, HeaderPolicyConfig, HeaderPolicyShape};
    use crate::upstream::BackendTarget;

    fn policy(shape: HeaderPolicyShape) -> HeaderPolicy {
        let target = BackendTarget::from_config(&BackendConfig::default()).unwrap();
        HeaderPolicy::from_config(
            &HeaderPolicyConfig {
                shape,
                ..HeaderPolicyConfig::default()
            },
            &target,
        )
    }

    #[tokio::test]
    async fn bodiless_methods_skip_the_body() {
        for method in [Method::GET, Method::HEAD] {
            let body = read_inbound(&method, &HeaderMap::new(), Body::from("ignored"), 1024)
                .await
                .unwrap();
            assert!(body.is_none());
        }
    }

    #[tokio::test]
    async fn empty_body_is_no_body() {
        let body = read_inbound(&Method::POST, &HeaderMap::new(), Body::empty(), 1024)
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn binary_body_is_exact() {
        let payload: Vec<u8> = (0..=255u8).chain([0, 0xff, 0x80, 0x0d, 0x0a]).collect();
        let body = read_inbound(&Method::PUT, &HeaderMap::new(), Body::from(payload.clone()), 1024)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_with_or_without_declared_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(2048u64));
        let err = read_inbound(&Method::POST, &headers, Body::from(vec![0u8; 2048]), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::PayloadTooLarge { limit: 1024 }));

        let err = read_inbound(&Method::POST, &HeaderMap::new(), Body::from(vec![0u8; 2048]), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::PayloadTooLarge { limit: 1024 }));
    }

    #[test]
    fn length_only_under_allow_list() {
        let body = Bytes::from_static(b"{\"a\":1}");

        let mut headers = HeaderMap::new();
        attach_length(&policy(HeaderPolicyShape::AllowList), &mut headers, Some(&body));
        assert_eq!(headers[CONTENT_LENGTH], "7");

        let mut headers = HeaderMap::new();
        attach_length(&policy(HeaderPolicyShape::AllowList), &mut headers, None);
        assert!(headers.get(CONTENT_LENGTH).is_none());

        let mut headers = HeaderMap::new();
        attach_length(&policy(HeaderPolicyShape::DenyList), &mut headers, Some(&body));
        assert!(headers.get(CONTENT_LENGTH).is_none());
    }
}
