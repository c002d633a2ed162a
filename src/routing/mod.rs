//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL (path, query)
//!     → resolver.rs (prefix strip or query-segment rebuild, query filter)
//!     → backend target URL
//! ```
//!
//! # Design Decisions
//! - One rewrite rule, fixed at startup
//! - Deterministic: same input always yields the same target
//! - Pure string work; no I/O and no normalization

pub mod resolver;

pub use resolver::PathResolver;
