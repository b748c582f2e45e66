//! HTTP server for LogServ.
//!
//! This module wires the request validator, the continuation codec, the
//! search engine, and the aggregator behind a small axum router. The
//! whole file surface hangs off a single wildcard route; `/metrics` is
//! the only reserved path.

mod config;
mod error;
pub mod handlers;
pub mod metrics;
mod middleware;
pub mod request;
pub mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tokio::signal;

pub use config::{CliArgs, ServerConfig, parse_hosts};
pub use error::ApiError;
pub use handlers::{AppState, Mode};

use crate::aggregator::Aggregator;
use metrics::Metrics;
use middleware::{MetricsLayer, TracingLayer};

/// The LogServ HTTP server.
pub struct LogServer {
    config: ServerConfig,
}

impl LogServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Run the HTTP server until SIGINT or SIGTERM.
    pub async fn run(self) {
        let mode = if self.config.hosts.is_empty() {
            tracing::info!("Serving files below {}", self.config.root.display());
            Mode::Local {
                root: self.config.root.clone(),
            }
        } else {
            tracing::info!(
                "Aggregating over {} peer(s): {}",
                self.config.hosts.len(),
                self.config.hosts.join(", ")
            );
            Mode::Aggregator(Arc::new(Aggregator::new(self.config.hosts.clone())))
        };

        let metrics = Arc::new(Metrics::new());
        let app = router(AppState { mode, metrics });

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        tracing::info!("Starting LogServ on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind server port");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .expect("Server failed");

        tracing::info!("Server shut down gracefully");
    }
}

/// Build the router for the given state.
///
/// The file route is registered for every method; the handler answers
/// non-GET requests itself so they share the 404 shape of a missing file
/// instead of axum's default 405.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::handle_metrics))
        .route("/{*path}", any(handlers::handle_tail))
        .fallback(handlers::handle_fallback)
        .layer(TracingLayer::new())
        .layer(MetricsLayer::new(state.metrics.clone()))
        .with_state(state)
}

/// Listen for SIGTERM (pod termination) and SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
