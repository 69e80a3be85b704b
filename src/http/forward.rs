//! Forwarding to the origin.
//!
//! # Responsibilities
//! - Define the outbound `Fetch` boundary
//! - Point the (possibly rewritten) request at the origin authority
//! - Enforce connect and request timeouts
//!
//! # Design Decisions
//! - Method, headers (including Host), query and body are sent as received
//! - HTTP/2 requests carry the client's authority in the URI, not in a Host
//!   header; it is copied into Host before the URI is pointed at the origin
//! - Bodies stream through in both directions, nothing is buffered
//! - No retries: failures are reported once and mapped by the caller

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::HOST,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, Response, Uri, Version,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::{OriginConfig, TimeoutConfig};

/// Failure reported by a [`Fetch`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid upstream URI: {0}")]
    InvalidUri(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Response<Body>, ForwardError>> + Send + 'a>>;

/// The outbound boundary: takes a request, eventually yields a response.
pub trait Fetch: Send + Sync {
    fn fetch(&self, request: Request<Body>) -> FetchFuture<'_>;
}

/// Sends requests to a single HTTP origin.
#[derive(Clone)]
pub struct OriginForwarder {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    request_timeout: Duration,
}

impl OriginForwarder {
    pub fn new(origin: &OriginConfig, timeouts: &TimeoutConfig) -> Result<Self, ForwardError> {
        let authority = origin_authority(&origin.url)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            authority,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Point an inbound request at the origin.
    fn prepare(&self, request: Request<Body>) -> Result<Request<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        if !parts.headers.contains_key(HOST) {
            if let Some(authority) = parts.uri.authority() {
                if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
                    parts.headers.insert(HOST, host);
                }
            }
        }

        parts.uri = self.target_uri(&parts.uri)?;
        // The origin connection speaks HTTP/1.1.
        if parts.version == Version::HTTP_2 {
            parts.version = Version::HTTP_11;
        }
        Ok(Request::from_parts(parts, body))
    }

    /// Absolute URI on the origin for an inbound request URI.
    fn target_uri(&self, uri: &Uri) -> Result<Uri, ForwardError> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts).map_err(|e| ForwardError::InvalidUri(e.to_string()))
    }
}

impl Fetch for OriginForwarder {
    fn fetch(&self, request: Request<Body>) -> FetchFuture<'_> {
        Box::pin(async move {
            let request = self.prepare(request)?;

            match tokio::time::timeout(self.request_timeout, self.client.request(request)).await {
                Ok(Ok(response)) => {
                    let (parts, body) = response.into_parts();
                    Ok(Response::from_parts(parts, Body::new(body)))
                }
                Ok(Err(e)) => Err(ForwardError::Upstream(e)),
                Err(_) => Err(ForwardError::Timeout(self.request_timeout)),
            }
        })
    }
}

fn origin_authority(raw: &str) -> Result<Authority, ForwardError> {
    let url = Url::parse(raw).map_err(|e| ForwardError::InvalidUri(format!("{}: {}", raw, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| ForwardError::InvalidUri(format!("{}: missing host", raw)))?;
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Authority::from_str(&authority).map_err(|e| ForwardError::InvalidUri(format!("{}: {}", raw, e)))
}
