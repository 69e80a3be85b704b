//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all rewrite handler
//! - Wire up middleware (tracing, request ID, concurrency limit)
//! - Apply the current rule set to every request
//! - Hand the outgoing request to the fetch collaborator
//! - Swap rule sets on config reload
//! - Serve until shutdown is signalled

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::RewriterConfig;
use crate::http::forward::{Fetch, ForwardError, OriginForwarder};
use crate::http::request::{request_id_middleware, RequestIdExt};
use crate::observability::metrics;
use crate::rewrite::{rewriter::with_path, Rewriter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rewriter: Arc<ArcSwap<Rewriter>>,
    pub fetcher: Arc<dyn Fetch>,
}

/// HTTP server for the edge rewriter.
pub struct HttpServer {
    router: Router,
    config: RewriterConfig,
    rewriter: Arc<ArcSwap<Rewriter>>,
}

impl HttpServer {
    /// Create a server that forwards to the configured origin.
    pub fn new(config: RewriterConfig) -> Result<Self, ForwardError> {
        let fetcher = OriginForwarder::new(&config.origin, &config.timeouts)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a server with a custom outbound collaborator.
    pub fn with_fetcher(config: RewriterConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let rewriter = Arc::new(ArcSwap::from_pointee(config.build_rewriter()));

        let state = AppState {
            rewriter: rewriter.clone(),
            fetcher,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            rewriter,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RewriterConfig, state: AppState) -> Router {
        // A fallback rather than `/{*path}` so that every path, including
        // ones with empty segments, reaches the handler verbatim.
        Router::new()
            .fallback(rewrite_handler)
            .with_state(state)
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_concurrent_requests,
            ))
    }

    /// The router, for serving it elsewhere or driving it in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live rule set.
    pub fn rewriter(&self) -> Arc<ArcSwap<Rewriter>> {
        self.rewriter.clone()
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Config updates received while running replace the rule set; the
    /// server stops accepting and drains in-flight requests once
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RewriterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.url,
            rules = self.config.rules.len(),
            "HTTP server starting"
        );

        let rewriter = self.rewriter.clone();
        let running = self.config.clone();
        let reload = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_config_update(&rewriter, &running, &new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Install the rules of `new` and report settings that only take effect
/// after a restart.
pub fn apply_config_update(
    rewriter: &ArcSwap<Rewriter>,
    running: &RewriterConfig,
    new: &RewriterConfig,
) -> Vec<&'static str> {
    let mut needs_restart = Vec::new();
    if new.listener.bind_address != running.listener.bind_address {
        needs_restart.push("listener.bind_address");
    }
    if new.listener.max_concurrent_requests != running.listener.max_concurrent_requests {
        needs_restart.push("listener.max_concurrent_requests");
    }
    if new.origin.url != running.origin.url {
        needs_restart.push("origin.url");
    }
    if new.timeouts.connect_secs != running.timeouts.connect_secs
        || new.timeouts.request_secs != running.timeouts.request_secs
    {
        needs_restart.push("timeouts");
    }

    for field in &needs_restart {
        tracing::warn!(field = *field, "Setting changed on reload; restart required to apply");
    }

    rewriter.store(Arc::new(new.build_rewriter()));
    tracing::info!(rules = new.rules.len(), "Rewrite rules reloaded");
    needs_restart
}

/// Catch-all handler: rewrite the path if a rule matches, then forward.
async fn rewrite_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %request.request_id(),
        method = %request.method(),
        path = %request.uri().path(),
    );
    handle(state, request).instrument(span).await
}

async fn handle(state: AppState, request: Request<Body>) -> Response {
    let start = Instant::now();
    // Requests keep the rule set they started with across a reload.
    let rewriter = state.rewriter.load_full();

    let request = match rewriter.evaluate(request.uri().path()) {
        Some(m) => {
            tracing::debug!(rule = m.rule, from = %request.uri().path(), to = %m.path, "Rewriting path");
            metrics::record_rewrite(metrics::OUTCOME_REWRITTEN, Some(m.rule));
            with_path(request, &m.path)
        }
        None => {
            tracing::trace!("No rule matched, forwarding unchanged");
            metrics::record_rewrite(metrics::OUTCOME_PASSTHROUGH, None);
            request
        }
    };

    match state.fetcher.fetch(request).await {
        Ok(response) => {
            tracing::debug!(status = %response.status(), "Origin responded");
            metrics::record_response(response.status().as_u16(), start);
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Upstream error");
            let response = e.into_response();
            metrics::record_response(response.status().as_u16(), start);
            response
        }
    }
}
