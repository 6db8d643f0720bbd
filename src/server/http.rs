//! HTTP server implementation for the remote read endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::signal;

use super::config::ReadServerConfig;
use super::handlers::{AppState, handle_healthy, handle_metrics, handle_read, handle_ready};
use super::metrics::Metrics;
use super::middleware::{MetricsLayer, TracingLayer};
use crate::error::{Error, Result};
use crate::pipeline::ReadPipeline;
use crate::series::GroupingOptions;
use crate::store::SeriesStore;

/// HTTP server for the remote read endpoint.
pub struct ReadServer {
    store: Arc<dyn SeriesStore>,
    grouping: GroupingOptions,
    config: ReadServerConfig,
}

impl ReadServer {
    /// Create a new remote read server.
    pub fn new(
        store: Arc<dyn SeriesStore>,
        grouping: GroupingOptions,
        config: ReadServerConfig,
    ) -> Self {
        Self {
            store,
            grouping,
            config,
        }
    }

    /// Build the application router with its middleware.
    pub fn router(&self, metrics: Arc<Metrics>) -> Router {
        let pipeline = ReadPipeline::new(self.store.clone())
            .with_options(self.grouping)
            .with_observer(metrics.clone());

        let state = AppState {
            pipeline,
            metrics: metrics.clone(),
        };

        Router::new()
            .route("/api/v1/read", post(handle_read))
            .route("/metrics", get(handle_metrics))
            .route("/-/healthy", get(handle_healthy))
            .route("/-/ready", get(handle_ready))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(TracingLayer::new())
            .layer(MetricsLayer::new(metrics))
            .with_state(state)
    }

    /// Run the HTTP server until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let metrics = Arc::new(Metrics::new());
        let app = self.router(metrics);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        tracing::info!("Starting remote read server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::InvalidInput(format!("Failed to bind {}: {}", addr, e)))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Listen for SIGTERM (K8s pod termination) and SIGINT (Ctrl+C).
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
