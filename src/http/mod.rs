//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, gateway handler)
//!     → request.rs (request ID)
//!     → [OPTIONS] security::cors answers directly
//!     → routing::resolver (target URL)
//!     → body.rs (inbound capture) + security::headers (upstream headers)
//!     → upstream (dispatch)
//!     → response.rs (assemble) or error.rs (502/4xx diagnostic)
//!     → security::cors (annotate) → client
//! ```

pub mod body;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::GatewayError;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, Gateway, HttpServer, ServerError};
