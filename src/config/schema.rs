//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the rewriter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::rewrite::{CategoryCollapseRule, RewriteRule, Rewriter};

/// Root configuration for the edge rewriter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Origin server requests are forwarded to.
    pub origin: OriginConfig,

    /// Rewrite rules, evaluated in order.
    pub rules: Vec<RuleConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            origin: OriginConfig::default(),
            rules: vec![RuleConfig::blog()],
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl RewriterConfig {
    /// Compile the configured rules into a rewriter.
    pub fn build_rewriter(&self) -> Rewriter {
        let rules = self
            .rules
            .iter()
            .map(|r| Box::new(CategoryCollapseRule::new(&r.name, &r.prefix)) as Box<dyn RewriteRule>)
            .collect();
        Rewriter::new(rules)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests handled at once (backpressure).
    pub max_concurrent_requests: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_concurrent_requests: 10_000,
        }
    }
}

/// Origin (upstream content server) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the origin, scheme and authority only
    /// (e.g., "http://127.0.0.1:3000").
    pub url: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// A category-collapsing rewrite rule.
///
/// `<prefix>/<category>/<item>` is fetched as `<prefix>/<item>`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Rule identifier for logging/metrics.
    pub name: String,

    /// Path prefix with leading slash, without trailing slash (e.g., "/blog").
    pub prefix: String,
}

impl RuleConfig {
    pub fn blog() -> Self {
        Self {
            name: "blog".to_string(),
            prefix: "/blog".to_string(),
        }
    }
}

/// Timeout configuration for forwarding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response headers) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "edge_rewrite=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
