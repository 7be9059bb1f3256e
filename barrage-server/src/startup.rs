//! Server startup and shutdown

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use barrage_config::BarrageConfig;
use tokio::net::TcpListener;

use crate::{app::create_app, context::AppContext, engine::HttpAttackEngine, logging};

pub struct Server {
    config: BarrageConfig,
    context: AppContext,
}

impl Server {
    /// Initialise logging and register metrics. Fails if the metric
    /// catalog cannot be registered.
    pub fn new(config: BarrageConfig) -> Result<Self> {
        logging::init_logging(&config.logging);

        let engine = Arc::new(HttpAttackEngine::new(config.engine.clone()));
        let context = AppContext::new(engine, &config.metrics).context("Failed to register metrics")?;

        Ok(Self { config, context })
    }

    pub fn build_app(&self) -> Router {
        create_app(self.context.clone(), &self.config.metrics.path)
    }

    pub async fn start(self) -> Result<()> {
        let addr = self
            .config
            .server
            .socket_addr()
            .with_context(|| format!("Invalid bind address {}", self.config.server.bind_address))?;
        let app = self.build_app();

        self.log_config_summary();

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_config_summary(&self) {
        tracing::info!("=== Barrage Server Configuration ===");
        tracing::info!("Bind Address: {}:{}", self.config.server.bind_address, self.config.server.port);
        tracing::info!("Metrics: {} (subsystem {})", self.config.metrics.path, self.config.metrics.subsystem);
        tracing::info!("Default scrape status: {}", self.config.metrics.default_status);
        tracing::info!("Result buffer: {}", self.config.engine.result_buffer);
        tracing::info!("=====================================");
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
