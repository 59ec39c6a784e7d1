// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

use super::infer::infer_handler;
use crate::config::ServerConfig;
use crate::inference::DetectionClient;
use crate::storage::ScratchDir;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn DetectionClient>,
    pub scratch: ScratchDir,
    pub model_id: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        client: Arc<dyn DetectionClient>,
        scratch: ScratchDir,
        model_id: impl Into<String>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            client,
            scratch,
            model_id: model_id.into(),
            max_upload_bytes,
        }
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        // Inference endpoint
        .route("/infer", post(infer_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_app(Arc::new(state));

    let addr = config.resolve_bind_addr().await?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
