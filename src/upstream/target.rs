//! The fixed backend every request is forwarded to.

use axum::http::HeaderValue;
use url::Url;

use crate::config::{BackendConfig, ConfigError};

/// Parsed backend base URL. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct BackendTarget {
    /// Base URL without trailing slash, ready for path concatenation.
    base: String,
    /// Value sent as `Host` when the deny-list policy rewrites it.
    host_header: HeaderValue,
}

impl BackendTarget {
    pub fn from_config(config: &BackendConfig) -> Result<Self, ConfigError> {
        let url = Url::parse(&config.base_url).map_err(|e| ConfigError::Invalid {
            field: "backend.base_url",
            message: e.to_string(),
        })?;
        let host = url.host_str().ok_or_else(|| ConfigError::Invalid {
            field: "backend.base_url",
            message: "missing host".to_string(),
        })?;

        // Url drops the port when it is the scheme default
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let host_header = HeaderValue::from_str(&authority).map_err(|e| ConfigError::Invalid {
            field: "backend.base_url",
            message: e.to_string(),
        })?;

        Ok(Self {
            base: config.base_url.trim_end_matches('/').to_string(),
            host_header,
        })
    }

    /// Base URL without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `host[:port]` of the backend.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }
}
