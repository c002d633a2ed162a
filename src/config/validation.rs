//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Backend URL is absolute http(s) with a host
//! - Rewrite rule and CORS origins are well formed
//! - Value ranges (timeouts > 0, body limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::{GatewayConfig, RewriteMode};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.backend.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::new(
                    "backend.base_url",
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::new("backend.base_url", "missing host"));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::new(
                    "backend.base_url",
                    "must not carry a query or fragment",
                ));
            }
        }
        Err(e) => errors.push(ValidationError::new("backend.base_url", e.to_string())),
    }

    if !config.route.prefix.is_empty() && !config.route.prefix.starts_with('/') {
        errors.push(ValidationError::new("route.prefix", "must start with '/'"));
    }
    if config.route.path_param.is_empty() {
        let message = match config.route.mode {
            RewriteMode::QueryParameter => "required in query_parameter mode",
            RewriteMode::LiteralPath => "must not be empty",
        };
        errors.push(ValidationError::new("route.path_param", message));
    }

    if HeaderValue::from_str(&config.headers.user_agent).is_err() {
        errors.push(ValidationError::new("headers.user_agent", "not a valid header value"));
    }

    for origin in &config.cors.allowed_origins {
        if HeaderValue::from_str(origin).is_err() || origin.is_empty() {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("'{}' is not a valid origin", origin),
            ));
        } else if origin.ends_with('/') {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("'{}' must not end with '/'", origin),
            ));
        }
    }
    if HeaderValue::from_str(&config.cors.allowed_methods.join(", ")).is_err() {
        errors.push(ValidationError::new("cors.allowed_methods", "not a valid header value"));
    }
    if HeaderValue::from_str(&config.cors.allowed_headers.join(", ")).is_err() {
        errors.push(ValidationError::new("cors.allowed_headers", "not a valid header value"));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.backend.base_url = "ftp://files.example".into();
        config.route.prefix = "api".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["backend.base_url", "route.prefix", "timeouts.request_secs"]
        );
    }

    #[test]
    fn rejects_base_url_with_query() {
        let mut config = GatewayConfig::default();
        config.backend.base_url = "https://backend.example/?x=1".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_origin_with_trailing_slash() {
        let mut config = GatewayConfig::default();
        config.cors.allowed_origins = vec!["https://app.example/".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "cors.allowed_origins");
    }

    #[test]
    fn query_parameter_mode_needs_param() {
        let mut config = GatewayConfig::default();
        config.route.mode = RewriteMode::QueryParameter;
        config.route.path_param = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].message, "required in query_parameter mode");
    }
}
