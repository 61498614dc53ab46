//! Worker REST server

use crate::common::{request_tracing_middleware, Config, Result};
use crate::coordinator::MemoryHerder;
use crate::rest::client::HttpRestClient;
use crate::rest::forward::Forwarder;
use crate::rest::summary::{create_router, SummaryState};
use axum::{extract::State, middleware, response::IntoResponse, routing::get, Router};
use serde_json::json;
use std::sync::Arc;

pub struct Worker {
    config: Config,
    herder: Arc<MemoryHerder>,
}

impl Worker {
    pub fn new(config: Config) -> Self {
        let herder = MemoryHerder::new(
            config.worker.advertised_url(),
            config.worker.leader_url.clone(),
        );
        for seed in &config.connectors {
            herder.seed_connector(seed);
        }
        Self {
            config,
            herder: Arc::new(herder),
        }
    }

    /// Full REST router: summary endpoints, health, request tracing.
    pub fn router(&self) -> Result<Router> {
        let client = Arc::new(HttpRestClient::new(self.config.worker.forward_timeout())?);
        let forwarder = Forwarder::new(client, self.config.worker.request_timeout());
        let summary = create_router(SummaryState::new(self.herder.clone(), forwarder));

        Ok(Router::new()
            .route("/health", get(health))
            .with_state(self.herder.clone())
            .merge(summary)
            .layer(middleware::from_fn(request_tracing_middleware)))
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_listener(
        self,
        listener: tokio::net::TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.router()?;
        let _herder_handle = self.herder.start()?;

        tracing::info!(
            "Worker ready ({})",
            if self.herder.is_leader() { "leader" } else { "follower" }
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Worker stopped: {}", self.config.node_id);
        Ok(())
    }

    /// Bind the configured address and serve until ctrl-c.
    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting worker: {}", self.config.node_id);
        tracing::info!("  REST API: {}", self.config.worker.bind_addr);
        tracing::info!("  Advertised URL: {}", self.config.worker.advertised_url());
        tracing::info!(
            "  Leader: {}",
            self.config.worker.leader_url.as_deref().unwrap_or("self")
        );
        tracing::info!("  Connectors: {}", self.config.connectors.len());

        let listener = tokio::net::TcpListener::bind(self.config.worker.bind_addr).await?;
        self.serve_with_listener(listener, shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Health check endpoint with the worker's leadership view.
async fn health(State(herder): State<Arc<MemoryHerder>>) -> impl IntoResponse {
    axum::Json(json!({
        "status": "healthy",
        "worker_id": herder.worker_id(),
        "is_leader": herder.is_leader(),
        "leader_url": herder.leader_url(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
