//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// The single backend all traffic is forwarded to.
    pub backend: BackendConfig,

    /// Path rewrite rule applied to every inbound URL.
    pub route: RouteConfig,

    /// Header policy shape for the upstream hop.
    pub headers: HeaderPolicyConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest inbound body accepted, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 32 * 1024 * 1024,
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL: scheme, host and optional port (e.g., "https://backend.example").
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7860".to_string(),
        }
    }
}

/// How the backend path is extracted from the inbound URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMode {
    /// Backend path is the inbound path with `prefix` removed.
    #[default]
    LiteralPath,
    /// Backend path is the `path_param` query values joined with `/`.
    QueryParameter,
}

/// Path rewrite rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Active extraction mode.
    pub mode: RewriteMode,

    /// Prefix stripped in literal-path mode (e.g., "/api"). Empty disables stripping.
    pub prefix: String,

    /// Internal query parameter. Carries the segments in query-parameter mode and is
    /// removed from the forwarded query string in both modes.
    pub path_param: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            mode: RewriteMode::LiteralPath,
            prefix: "/api".to_string(),
            path_param: "path".to_string(),
        }
    }
}

/// Which headers travel from client to backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicyShape {
    /// Only Content-Type, Accept, User-Agent and Authorization, with defaults.
    #[default]
    AllowList,
    /// Everything except Host, Content-Length and Connection; Host is rewritten.
    DenyList,
}

/// Header policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderPolicyConfig {
    /// Active policy shape.
    pub shape: HeaderPolicyShape,

    /// User-Agent sent when the client supplies none (allow-list shape).
    pub user_agent: String,
}

impl Default for HeaderPolicyConfig {
    fn default() -> Self {
        Self {
            shape: HeaderPolicyShape::AllowList,
            user_agent: "edge-gateway".to_string(),
        }
    }
}

/// Preflight answer for origins outside the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedOrigin {
    /// Answer with `Access-Control-Allow-Origin: *`.
    #[default]
    Wildcard,
    /// Answer without any `Access-Control-Allow-Origin`.
    Deny,
}

/// Cross-origin policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins (scheme + host + port) that get their origin echoed.
    pub allowed_origins: Vec<String>,

    /// Preflight behavior for origins not in the list.
    pub unmatched: UnmatchedOrigin,

    /// Methods announced in preflight answers.
    pub allowed_methods: Vec<String>,

    /// Request headers announced in preflight answers.
    pub allowed_headers: Vec<String>,

    /// Preflight cache duration in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            unmatched: UnmatchedOrigin::Wildcard,
            allowed_methods: ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age_secs: 86_400,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Upstream exchange timeout in seconds (until response headers and body complete).
    pub upstream_secs: u64,

    /// Overall inbound request limit in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 60,
            request_secs: 90,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
