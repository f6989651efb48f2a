//! HTTP server implementation for the revtag API.

use crate::{config::ApiConfig, router::build_router, state::AppContext, ApiError};
use axum::Router;
use revtag_core::RevtagConfig;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// HTTP server for the revtag API.
pub struct ApiServer {
    config: ApiConfig,
    router: Router,
}

impl ApiServer {
    /// Create a new API server over an already loaded context.
    pub fn new(config: ApiConfig, ctx: Arc<AppContext>) -> Self {
        let router = build_router(&config, ctx);

        Self { config, router }
    }

    /// Run the server until shutdown signal.
    pub async fn run(self) -> Result<(), ApiError> {
        let addr = self.config.bind_addr;

        info!("Starting revtag API server");
        info!("CORS enabled: {}", self.config.enable_cors);

        let router = self.build_router_with_middleware();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            ApiError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;

        info!("Server listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Http(format!("Server error: {}", e)))?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Build router with all middleware layers.
    pub fn build_router_with_middleware(&self) -> Router {
        let mut router = self.router.clone();

        if self.config.request_timeout_seconds > 0 {
            router = router.layer(tower_http::timeout::TimeoutLayer::new(
                std::time::Duration::from_secs(self.config.request_timeout_seconds),
            ));
        }

        if self.config.enable_request_logging {
            router = router.layer(tower_http::trace::TraceLayer::new_for_http());
        }

        router.layer(tower_http::limit::RequestBodyLimitLayer::new(
            self.config.max_body_size,
        ))
    }
}

/// Shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}

/// Load everything from the core configuration and serve until shutdown.
pub async fn start_server(core_config: &RevtagConfig) -> Result<(), ApiError> {
    let config = ApiConfig::from_core_config(core_config)?;
    let ctx = Arc::new(AppContext::from_config(core_config)?);
    info!(
        "revtag {} loaded model labels: {}",
        env!("CARGO_PKG_VERSION"),
        ctx.pipeline.labels().join(", ")
    );

    ApiServer::new(config, ctx).run().await
}
