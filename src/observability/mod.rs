//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gateway_handler / forward
//!     → logging.rs (request-scoped events keyed by x-request-id)
//!     → metrics.rs (per-request counter and latency histogram)
//!
//! Sinks:
//!     → stdout, pretty or JSON
//!     → Prometheus scrape endpoint, when enabled
//! ```
//!
//! # Design Decisions
//! - Header values are logged only after redaction
//! - Metric recording is free until an exporter is installed

pub mod logging;
pub mod metrics;
