//! Edge HTTP gateway: forwards every request to one fixed backend with path
//! rewriting, header mediation, verbatim body relay and local CORS preflight.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
