//! Cross-origin policy.
//!
//! # Responsibilities
//! - Answer preflight (OPTIONS) requests without contacting the backend
//! - Annotate every other response with Access-Control-Allow-* headers
//!
//! # Design Decisions
//! - Origins match exactly (scheme + host + port); no subdomain wildcards
//! - The wildcard origin is never combined with credentials
//! - The gateway owns Allow-Origin/Allow-Credentials; backend values are replaced

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::config::{ConfigError, CorsConfig, UnmatchedOrigin};

/// Immutable CORS policy built at startup.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<HeaderValue>,
    unmatched: UnmatchedOrigin,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
}

/// How a request's Origin relates to the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginMatch {
    /// No Origin header (or an empty one).
    Absent,
    Allowed(HeaderValue),
    Rejected,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ConfigError> {
        let invalid = |field: &'static str| {
            move |e: axum::http::header::InvalidHeaderValue| ConfigError::Invalid {
                field,
                message: e.to_string(),
            }
        };

        let allowed_origins = config
            .allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(invalid("cors.allowed_origins")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            allowed_origins,
            unmatched: config.unmatched,
            allow_methods: HeaderValue::from_str(&config.allowed_methods.join(", "))
                .map_err(invalid("cors.allowed_methods"))?,
            allow_headers: HeaderValue::from_str(&config.allowed_headers.join(", "))
                .map_err(invalid("cors.allowed_headers"))?,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    /// Classify the Origin header value.
    pub fn classify(&self, origin: Option<&HeaderValue>) -> OriginMatch {
        match origin {
            None => OriginMatch::Absent,
            Some(value) if value.is_empty() => OriginMatch::Absent,
            Some(value) if self.allowed_origins.iter().any(|o| o.as_bytes() == value.as_bytes()) => {
                OriginMatch::Allowed(value.clone())
            }
            Some(_) => OriginMatch::Rejected,
        }
    }

    /// 204 answer for an OPTIONS request.
    pub fn preflight(&self, origin: Option<&HeaderValue>) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());

        match self.classify(origin) {
            OriginMatch::Allowed(origin) => echo_origin(headers, origin),
            _ if self.unmatched == UnmatchedOrigin::Wildcard => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            }
            _ => {}
        }
        response
    }

    /// Apply the policy to a non-preflight response.
    pub fn annotate(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        headers.remove(ACCESS_CONTROL_ALLOW_ORIGIN);
        headers.remove(ACCESS_CONTROL_ALLOW_CREDENTIALS);

        match self.classify(origin) {
            OriginMatch::Allowed(origin) => echo_origin(headers, origin),
            OriginMatch::Absent => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            }
            // browser withholds the response from script; CORS is not authorization
            OriginMatch::Rejected => {}
        }
    }
}

fn echo_origin(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.append(VARY, HeaderValue::from_static("Origin"));
}
