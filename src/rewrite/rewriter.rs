//! Rule evaluation over paths, URLs and requests.
//!
//! # Responsibilities
//! - Hold the ordered rule set
//! - Find the first rule that matches a path
//! - Apply the canonical path to a URL or request, preserving the rest
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - Requests are moved through, never cloned; only the URI is rebuilt

use axum::http::{uri::PathAndQuery, Request, Uri};
use url::Url;

use crate::rewrite::rule::{CategoryCollapseRule, Rewrite, RewriteRule};

/// A successful rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    /// Name of the rule that matched.
    pub rule: &'a str,
    /// Canonical path produced by the rule.
    pub path: String,
}

/// Ordered set of rewrite rules. First match wins.
#[derive(Debug, Default)]
pub struct Rewriter {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Rewriter {
    pub fn new(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self { rules }
    }

    /// A rewriter holding only the `/blog/<category>/<item>` rule.
    pub fn blog() -> Self {
        Self::new(vec![Box::new(CategoryCollapseRule::blog())])
    }

    pub fn rules(&self) -> &[Box<dyn RewriteRule>] {
        &self.rules
    }

    /// Find the first rule matching `path`.
    pub fn evaluate(&self, path: &str) -> Option<RuleMatch<'_>> {
        self.rules.iter().find_map(|rule| match rule.apply(path) {
            Rewrite::Rewritten(path) => Some(RuleMatch {
                rule: rule.name(),
                path,
            }),
            Rewrite::NoMatch => None,
        })
    }

    pub fn rewrite_path(&self, path: &str) -> Rewrite {
        match self.evaluate(path) {
            Some(m) => Rewrite::Rewritten(m.path),
            None => Rewrite::NoMatch,
        }
    }

    /// Rewrite the path of a full URL. Scheme, credentials, host, port,
    /// query and fragment are kept.
    pub fn rewrite_url(&self, url: &Url) -> Url {
        let mut out = url.clone();
        if let Some(m) = self.evaluate(url.path()) {
            out.set_path(&m.path);
        }
        out
    }

    /// Rewrite the path of a request. Method, version, headers, extensions,
    /// body and query are carried over untouched. Without a match the
    /// request is returned as-is.
    pub fn rewrite_request<B>(&self, request: Request<B>) -> Request<B> {
        let path = match self.evaluate(request.uri().path()) {
            Some(m) => m.path,
            None => return request,
        };
        with_path(request, &path)
    }
}

/// Replace the path of a request URI, keeping scheme, authority and query.
pub fn with_path<B>(request: Request<B>, path: &str) -> Request<B> {
    let (mut parts, body) = request.into_parts();

    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    match replace_path_and_query(&parts.uri, &path_and_query) {
        Some(uri) => parts.uri = uri,
        None => {
            tracing::warn!(
                uri = %parts.uri,
                path = %path,
                "Rewritten path is not a valid URI; forwarding unchanged"
            );
        }
    }

    Request::from_parts(parts, body)
}

fn replace_path_and_query(uri: &Uri, path_and_query: &str) -> Option<Uri> {
    let path_and_query: PathAndQuery = path_and_query.parse().ok()?;
    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query = Some(path_and_query);
    Uri::from_parts(uri_parts).ok()
}
