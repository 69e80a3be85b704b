//! Rewrite rules.
//!
//! # Responsibilities
//! - Recognize a decorated path shape
//! - Compute the canonical path for it
//!
//! # Design Decisions
//! - Literal, case-sensitive comparison on the raw path
//! - Anchored at both ends: deeper hierarchies are not collapsed

/// Outcome of evaluating a rule against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The path does not have the shape the rule recognizes.
    NoMatch,
    /// The canonical path to fetch instead.
    Rewritten(String),
}

/// A pure mapping from a request path to a rewrite outcome.
pub trait RewriteRule: Send + Sync + std::fmt::Debug {
    /// Rule identifier for logging/metrics.
    fn name(&self) -> &str;

    /// Evaluate the rule. Must not depend on anything but `path`.
    fn apply(&self, path: &str) -> Rewrite;
}

/// Drops the category segment from `<prefix>/<category>/<item>`.
///
/// With the prefix `/blog`, `/blog/news/2024-launch` becomes
/// `/blog/2024-launch`. Both `<category>` and `<item>` must be non-empty
/// and free of `/`; anything else (`/blog/x`, `/blog/x/y/z`, `/blog//y`,
/// `/blog/x/y/`) is left alone.
#[derive(Debug, Clone)]
pub struct CategoryCollapseRule {
    name: String,
    /// Prefix including the leading slash and excluding the trailing one.
    prefix: String,
}

impl CategoryCollapseRule {
    /// Create a rule for `prefix` (e.g. `"/blog"`).
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }

    /// The `/blog/<category>/<item>` rule.
    pub fn blog() -> Self {
        Self::new("blog", "/blog")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl RewriteRule for CategoryCollapseRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, path: &str) -> Rewrite {
        let rest = match path
            .strip_prefix(self.prefix.as_str())
            .and_then(|p| p.strip_prefix('/'))
        {
            Some(rest) => rest,
            None => return Rewrite::NoMatch,
        };

        let (category, item) = match rest.split_once('/') {
            Some(parts) => parts,
            None => return Rewrite::NoMatch,
        };

        if category.is_empty() || item.is_empty() || item.contains('/') {
            return Rewrite::NoMatch;
        }

        Rewrite::Rewritten(format!("{}/{}", self.prefix, item))
    }
}
