//! Application startup and lifecycle management.

use crate::config::InsightConfig;
use crate::services::providers::ChatProvider;
use crate::services::{GatewayChatProvider, PostgrestRecordStore, RecordStore};
use crate::{build_router, AppState};
use axum::Router;
use service_core::error::AppError;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build against the hosted record store and model gateway.
    pub async fn build(config: InsightConfig) -> Result<Self, AppError> {
        let store: Arc<dyn RecordStore> =
            Arc::new(PostgrestRecordStore::new(&config.records).map_err(|e| {
                tracing::error!("Failed to initialize record store client: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e.to_string()))
            })?);

        let provider: Arc<dyn ChatProvider> =
            Arc::new(GatewayChatProvider::new(&config.gateway).map_err(|e| {
                tracing::error!("Failed to initialize model gateway client: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e.to_string()))
            })?);

        if config.gateway_configured() {
            tracing::info!(
                model = %config.gateway.model,
                structured_output = config.gateway.structured_output,
                "Initialized model gateway provider"
            );
        } else {
            tracing::warn!("MODEL_GATEWAY_API_KEY not set; analysis requests will fail");
        }

        Self::build_with(config, store, provider).await
    }

    /// Build with explicit collaborators (port 0 binds a random port).
    pub async fn build_with(
        config: InsightConfig,
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let state = AppState::new(config, store, provider);
        let router = build_router(state);

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Insight service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Serve until `shutdown` resolves, letting in-flight requests finish.
    pub async fn run_with_graceful_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
