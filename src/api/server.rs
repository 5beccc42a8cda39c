//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::models::{DiscoverRequest, VideoQuery};
use crate::config::Config;
use crate::discovery::Discovery;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<Discovery>,
    pub config: Arc<Config>,
}

/// Build the application router with middleware
pub fn router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/api/videos", get(get_videos_handler))
        .route("/api/videos/discover", post(discover_handler))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(app_state: AppState, host: &str, port: u16) -> Result<()> {
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("🌐 API server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check(&state.config).await))
}

async fn get_videos_handler(State(state): State<AppState>, Query(query): Query<VideoQuery>) -> Response {
    match handlers::get_videos(&state, query).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn discover_handler(State(state): State<AppState>, Json(payload): Json<DiscoverRequest>) -> Response {
    match handlers::discover(&state, payload).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => e.into_response(),
    }
}
