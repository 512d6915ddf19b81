use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, Router};
use tokio::net::TcpListener;
use tower::{limit::ConcurrencyLimitLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::accounts::{
    create_account_routes, AccountService, AppConfig, CredentialStore, SqliteStore,
};

/// Concurrent request limit
pub const MAX_CONCURRENCY: usize = 256;

/// Request body size limit
pub const MAX_BODY_SIZE: usize = 64 * 1024; // 64KB

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AccountServer {
    pub service: Arc<AccountService>,
    pub host: String,
    pub port: u16,
}

impl AccountServer {
    pub fn new(service: Arc<AccountService>, host: String, port: u16) -> Self {
        Self { service, host, port }
    }

    /// Connect the SQLite store described by `config` and build the service
    pub async fn from_config(config: &AppConfig) -> Result<Self, anyhow::Error> {
        let store = SqliteStore::connect(&config.server.database_url, config.server.max_connections)
            .await
            .map_err(|e| anyhow::anyhow!("user database initialization failed: {}", e))?;
        let store: Arc<dyn CredentialStore> = Arc::new(store);

        let service = AccountService::new(store, config.accounts.clone())
            .map_err(|e| anyhow::anyhow!("account service initialization failed: {}", e))?;

        Ok(Self::new(
            Arc::new(service),
            config.server.host.clone(),
            config.server.port,
        ))
    }

    pub fn create_router(&self) -> Router {
        create_account_routes(self.service.clone()).layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    if err.is::<tower::timeout::error::Elapsed>() {
                        (StatusCode::REQUEST_TIMEOUT, "request timed out")
                    } else {
                        (StatusCode::SERVICE_UNAVAILABLE, "service overloaded")
                    }
                }))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENCY))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(TraceLayer::new_for_http()),
        )
    }

    pub async fn start(self) -> Result<(), anyhow::Error> {
        let app = self.create_router();
        let addr = format!("{}:{}", self.host, self.port);
        tracing::info!("Server listening on {}", addr);
        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
