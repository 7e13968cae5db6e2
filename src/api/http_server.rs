// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::ocr::{ocr_handler, HealthResponse};
use crate::config::ServiceConfig;
use crate::version::VERSION_NUMBER;
use crate::vision::{DebugArtifactWriter, OcrEngine};

/// Room for multipart boundaries and part headers on top of the file limit
pub const MULTIPART_FRAMING_ALLOWANCE: usize = 64 * 1024;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub engine: Arc<dyn OcrEngine>,
    pub debug_writer: DebugArtifactWriter,
}

impl AppState {
    pub fn new(config: ServiceConfig, engine: Arc<dyn OcrEngine>) -> Self {
        let debug_writer = config.debug_writer();
        Self::with_debug_writer(config, engine, debug_writer)
    }

    pub fn with_debug_writer(
        config: ServiceConfig,
        engine: Arc<dyn OcrEngine>,
        debug_writer: DebugArtifactWriter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            debug_writer,
        }
    }
}

/// Cross-origin policy: any origin, method and header
///
/// Wildcards cannot be combined with credentials, so when credentials are
/// allowed the request's own origin, method and headers are mirrored back.
pub fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    if config.cors_allow_credentials {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    // The `file` field itself is checked against `max_upload_bytes` in the handler
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_FRAMING_ALLOWANCE);

    Router::new()
        // Image-to-text endpoint
        .route("/", post(ocr_handler))
        // Health check
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.socket_addr()?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("OCR server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("OCR server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION_NUMBER.to_string(),
        engine: state.engine.name().to_string(),
        language: state.config.language.clone(),
        deskew: state.config.deskew,
    })
}
