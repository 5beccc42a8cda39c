//! API request handlers

use serde_json::Value;
use tracing::info;

use super::models::{ApiError, DiscoverRequest, DiscoverResponse, TagReport, VideoQuery, VideoResponse};
use super::server::AppState;
use crate::config::Config;

/// Handle health check requests
pub async fn health_check(config: &Config) -> Value {
    serde_json::json!({
        "status": "healthy",
        "service": "videofinder",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "cache_enabled": config.cache.enabled,
        "classifier_enabled": config.classifier.endpoint.is_some(),
    })
}

/// Per-request key wins over the server key; blanks count as absent
pub fn resolve_api_key(config: &Config, requested: Option<&str>) -> Option<String> {
    requested
        .or(config.youtube.api_key.as_deref())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

/// Handle single-tag discovery (`GET /api/videos`)
pub async fn get_videos(state: &AppState, query: VideoQuery) -> Result<VideoResponse, ApiError> {
    let tag = query
        .tag
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(ApiError::no_tag)?;
    let requested_key = query.api_key.as_deref().filter(|k| !k.trim().is_empty());
    let api_key = resolve_api_key(&state.config, requested_key).ok_or_else(ApiError::missing_api_key)?;
    let page_token = normalize_token(query.page_token);

    let result = state
        .discovery
        .discover(std::slice::from_ref(&tag), page_token.as_deref(), &api_key)
        .await?;

    if let Some(err) = result.failure() {
        return Err(err.clone().into());
    }

    Ok(VideoResponse {
        tag,
        count: result.videos.len(),
        videos: result.videos,
        next_page_token: result.next_page_token,
    })
}

/// Handle multi-tag discovery (`POST /api/videos/discover`)
pub async fn discover(state: &AppState, request: DiscoverRequest) -> Result<DiscoverResponse, ApiError> {
    if request.tags.is_empty() {
        return Err(ApiError::no_tag());
    }
    let requested_key = request.api_key.as_deref().filter(|k| !k.trim().is_empty());
    let api_key = resolve_api_key(&state.config, requested_key).ok_or_else(ApiError::missing_api_key)?;
    let page_token = normalize_token(request.page_token);

    info!("📥 Discovery request for {} tags", request.tags.len());
    let result = state
        .discovery
        .discover(&request.tags, page_token.as_deref(), &api_key)
        .await?;

    if let Some(err) = result.failure() {
        return Err(err.clone().into());
    }

    Ok(DiscoverResponse {
        count: result.videos.len(),
        videos: result.videos,
        next_page_token: result.next_page_token,
        tags: result.tags.into_iter().map(TagReport::from).collect(),
    })
}
