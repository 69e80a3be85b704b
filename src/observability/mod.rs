//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → logging.rs (structured log events, request ID in every span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every log line of a request
//! - Metrics are optional and cheap when disabled

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
