//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID for logging)
//!     → rewrite::Rewriter (decorated path → canonical path)
//!     → forward.rs (send to origin)
//!     → response.rs (map forwarding failures)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{Fetch, FetchFuture, ForwardError, OriginForwarder};
pub use request::{request_id_middleware, RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{apply_config_update, AppState, HttpServer};
