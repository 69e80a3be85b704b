//! Response handling.
//!
//! # Responsibilities
//! - Map forwarding failures to gateway status codes
//!
//! # Design Decisions
//! - Origin responses are returned untouched, including error statuses
//! - Only failures to obtain a response are mapped here
//! - Timeouts result in 504 Gateway Timeout, everything else in 502

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::forward::ForwardError;

impl ForwardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::InvalidUri(_) | ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let message = match self {
            ForwardError::Timeout(_) => "Upstream request timed out",
            ForwardError::InvalidUri(_) | ForwardError::Upstream(_) => "Upstream request failed",
        };
        (self.status_code(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ForwardError::Timeout(Duration::from_secs(1)).into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ForwardError::InvalidUri("x".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
