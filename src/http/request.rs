//! Request identification.
//!
//! # Responsibilities
//! - Reuse the client's `x-request-id` or generate a UUID v4
//! - Make the ID available to handlers for logging
//!
//! # Design Decisions
//! - The ID lives in request extensions, never in forwarded headers:
//!   the origin sees exactly the headers the client sent
//! - Responses are not decorated with the ID for the same reason

use axum::{
    extract::Request,
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation ID attached to each inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Access the request ID stored by [`request_id_middleware`].
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("unknown")
    }
}

pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id));
    next.run(req).await
}
