//! Inbound URL → backend target URL.
//!
//! # Responsibilities
//! - Literal-path mode: strip the configured prefix when present
//! - Query-parameter mode: rebuild the path from the routing parameter's values
//! - Drop the routing parameter from the query; keep every other pair verbatim
//!
//! # Design Decisions
//! - No `.`/`..` normalization; the backend owns path semantics
//! - Query pairs are never re-encoded, only filtered
//! - The target is an `http::Uri`, which validates but never rewrites
//! - A missing prefix is not an error; the path passes through

use axum::http::Uri;
use url::form_urlencoded;

use crate::config::{RewriteMode, RouteConfig};
use crate::http::error::GatewayError;
use crate::upstream::BackendTarget;

/// Resolves backend URLs for one fixed backend and rewrite rule.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: String,
    mode: RewriteMode,
    prefix: String,
    path_param: String,
}

impl PathResolver {
    pub fn new(target: &BackendTarget, rule: &RouteConfig) -> Self {
        Self {
            base: target.base().to_string(),
            mode: rule.mode,
            prefix: rule.prefix.trim_end_matches('/').to_string(),
            path_param: rule.path_param.clone(),
        }
    }

    /// `base + rewritten path + filtered query`.
    pub fn resolve(&self, uri: &Uri) -> Result<Uri, GatewayError> {
        let query = uri.query();
        let path = match self.mode {
            RewriteMode::LiteralPath => strip_prefix(uri.path(), &self.prefix).to_string(),
            RewriteMode::QueryParameter => path_from_query(query, &self.path_param),
        };
        let query = filter_query(query, &self.path_param);

        let mut target = String::with_capacity(self.base.len() + path.len() + query.len() + 1);
        target.push_str(&self.base);
        target.push_str(&path);
        if !query.is_empty() {
            target.push('?');
            target.push_str(&query);
        }

        Uri::try_from(target)
            .map_err(|e| GatewayError::InvalidRequest(format!("cannot build backend URL: {}", e)))
    }
}

/// Remove `prefix` when the path is `prefix` followed by `/`.
pub fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Join the raw values of `param` with `/`. Absent parameter yields the root.
pub fn path_from_query(query: Option<&str>, param: &str) -> String {
    let segments: Vec<&str> = pairs(query)
        .filter(|pair| key_matches(pair, param))
        .map(|pair| pair.split_once('=').map_or("", |(_, value)| value))
        .filter(|value| !value.is_empty())
        .collect();

    format!("/{}", segments.join("/"))
}

/// Drop every `param` pair; keep the rest in order and in their original encoding.
pub fn filter_query(query: Option<&str>, param: &str) -> String {
    pairs(query)
        .filter(|pair| !key_matches(pair, param))
        .collect::<Vec<_>>()
        .join("&")
}

fn pairs(query: Option<&str>) -> impl Iterator<Item = &str> {
    query
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
}

/// Compare the decoded key of a raw `key=value` pair.
fn key_matches(pair: &str, param: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn resolver(mode: RewriteMode) -> PathResolver {
        let target = BackendTarget::from_config(&BackendConfig {
            base_url: "https://backend.example".into(),
        })
        .unwrap();
        PathResolver::new(
            &target,
            &RouteConfig {
                mode,
                prefix: "/api".into(),
                path_param: "path".into(),
            },
        )
    }

    fn resolve(mode: RewriteMode, uri: &str) -> String {
        resolver(mode)
            .resolve(&uri.parse().unwrap())
            .unwrap()
            .to_string()
    }

    #[test]
    fn strips_api_prefix() {
        assert_eq!(
            resolve(RewriteMode::LiteralPath, "/api/admin/stats"),
            "https://backend.example/admin/stats"
        );
    }

    #[test]
    fn passes_unprefixed_paths() {
        assert_eq!(
            resolve(RewriteMode::LiteralPath, "/v1/chat"),
            "https://backend.example/v1/chat"
        );
        assert_eq!(strip_prefix("/apix/y", "/api"), "/apix/y");
        assert_eq!(strip_prefix("/api", "/api"), "/api");
        assert_eq!(strip_prefix("/public/a", ""), "/public/a");
    }

    #[test]
    fn strip_removes_exactly_the_prefix() {
        for path in ["/api/", "/api/a", "/api/a/b/c", "/api//x"] {
            assert_eq!(strip_prefix(path, "/api"), &path[4..]);
        }
    }

    #[test]
    fn drops_routing_param_and_keeps_others() {
        assert_eq!(
            resolve(RewriteMode::LiteralPath, "/api/logs?path=api&limit=10&q=a%20b&path=logs"),
            "https://backend.example/logs?limit=10&q=a%20b"
        );
        assert_eq!(
            resolve(RewriteMode::LiteralPath, "/api/logs?path=logs"),
            "https://backend.example/logs"
        );
    }

    #[test]
    fn rebuilds_path_from_query_segments() {
        assert_eq!(
            resolve(
                RewriteMode::QueryParameter,
                "/api/whatever?path=admin&path=accounts&page=2"
            ),
            "https://backend.example/admin/accounts?page=2"
        );
    }

    #[test]
    fn missing_param_resolves_to_root() {
        assert_eq!(
            resolve(RewriteMode::QueryParameter, "/api?x=1"),
            "https://backend.example/?x=1"
        );
        assert_eq!(path_from_query(None, "path"), "/");
    }

    #[test]
    fn dot_segments_and_raw_query_reach_the_backend_untouched() {
        assert_eq!(
            resolve(RewriteMode::LiteralPath, "/api/admin/../public/x?q=it's"),
            "https://backend.example/admin/../public/x?q=it's"
        );
        assert_eq!(
            resolve(RewriteMode::LiteralPath, "/api/a/%2e%2e/b"),
            "https://backend.example/a/%2e%2e/b"
        );
        assert_eq!(
            resolve(RewriteMode::QueryParameter, "/api?path=..&path=etc&q=%27x%27"),
            "https://backend.example/../etc?q=%27x%27"
        );
    }

    #[test]
    fn encoded_key_still_matches() {
        assert_eq!(filter_query(Some("pa%74h=a&b=c"), "path"), "b=c");
        assert_eq!(filter_query(Some("pathx=1&b"), "path"), "pathx=1&b");
    }

    #[test]
    fn segments_keep_their_encoding() {
        assert_eq!(path_from_query(Some("path=a%2Fb&path=&path=c"), "path"), "/a%2Fb/c");
    }
}
