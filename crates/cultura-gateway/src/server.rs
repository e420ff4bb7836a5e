//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use cultura_agent::CheckAgent;
use cultura_core::config::CulturaConfig;
use cultura_core::error::{CulturaError, Result};
use cultura_knowledge::LexicalRanker;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: CulturaConfig,
    /// The review/chat agent — owns the provider handle and extractor.
    pub agent: Arc<CheckAgent>,
    /// Direct retrieval handle for the search endpoint (no LLM involved).
    pub ranker: LexicalRanker,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: CulturaConfig, agent: Arc<CheckAgent>) -> Self {
        let ranker = agent.ranker().clone();
        Self {
            config,
            agent,
            ranker,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/info", get(super::routes::system_info))
        .route("/api/v1/check", post(super::routes::check_content))
        .route("/api/v1/chat", post(super::routes::chat))
        .route("/api/v1/search", get(super::routes::search_knowledge))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind and serve until shutdown.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.gateway.host, state.config.gateway.port);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CulturaError::Gateway(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("🌙 CulturaCheck gateway listening on http://{addr}");

    axum::serve(listener, router)
        .await
        .map_err(|e| CulturaError::Gateway(e.to_string()))?;
    Ok(())
}
