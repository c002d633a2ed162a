//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (OPTIONS answered here, never forwarded)
//!     → headers.rs (upstream header set per policy shape)
//! Backend response:
//!     → headers.rs (framing headers dropped)
//!     → cors.rs (Access-Control-Allow-* annotation)
//! ```
//!
//! # Design Decisions
//! - Policies are built once from config and shared read-only
//! - Credentials never appear in diagnostic output

pub mod cors;
pub mod headers;

pub use cors::{CorsPolicy, OriginMatch};
pub use headers::HeaderPolicy;
