//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_rewrite_requests_total` (counter): requests by outcome and rule
//! - `edge_rewrite_upstream_responses_total` (counter): origin responses by status
//! - `edge_rewrite_request_duration_seconds` (histogram): end-to-end latency
//!
//! Recording is a no-op until a recorder is installed, so handlers call
//! these unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label for a request that matched a rule.
pub const OUTCOME_REWRITTEN: &str = "rewritten";
/// Outcome label for a request forwarded unchanged.
pub const OUTCOME_PASSTHROUGH: &str = "passthrough";

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the rewrite decision for a request.
pub fn record_rewrite(outcome: &'static str, rule: Option<&str>) {
    let rule = rule.unwrap_or("none").to_string();
    metrics::counter!("edge_rewrite_requests_total", "outcome" => outcome, "rule" => rule).increment(1);
}

/// Record the final status returned to the client and the elapsed time.
pub fn record_response(status: u16, start: Instant) {
    metrics::counter!("edge_rewrite_upstream_responses_total", "status" => status.to_string())
        .increment(1);
    metrics::histogram!("edge_rewrite_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
