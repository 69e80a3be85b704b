//! Edge path rewriter.
//!
//! Sits between clients and an origin content server. Requests for
//! decorated paths such as `/blog/<category>/<item>` are fetched from the
//! canonical `/blog/<item>` while the client keeps the URL it asked for.
//! Everything else is forwarded unchanged.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌─────────┐    ┌──────────┐    ┌─────────┐
//!     ───────────────────▶│  http   │───▶│ rewrite  │───▶│ forward │───▶ Origin
//!                         │ server  │    │ rules    │    │ (fetch) │
//!     Client Response     └─────────┘    └──────────┘    └─────────┘
//!     ◀──────────────────────────────── untouched ◀─────────────────────
//!
//!     Cross-cutting: config (+ hot reload), observability, lifecycle
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::schema::RewriterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rewrite::{Rewrite, RewriteRule, Rewriter};
