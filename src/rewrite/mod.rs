//! Path rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path + query + everything else)
//!     → rewriter.rs (walk rules in order)
//!     → rule.rs (structural test on the raw path)
//!     → Return: Rewritten(canonical path) or NoMatch
//!
//! On Rewritten:
//!     → rebuild URI with new path, original query
//!     → method, headers, body, extensions carried over untouched
//! On NoMatch:
//!     → original request returned as-is
//! ```
//!
//! # Design Decisions
//! - Rules are pure functions of the path string
//! - No regex: the decorated shape is checked segment by segment
//! - No normalization (case, percent-encoding, trailing slash)
//! - First match wins; at most one rewrite per request

pub mod rule;
pub mod rewriter;

pub use rewriter::Rewriter;
pub use rule::{CategoryCollapseRule, Rewrite, RewriteRule};
