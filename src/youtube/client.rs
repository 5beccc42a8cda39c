use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::models::{ApiErrorResponse, ChannelListResponse, SearchListResponse, VideoListResponse};
use crate::config::YouTubeConfig;
use crate::discovery::{BackendFactory, CandidateVideo, SearchPage, SearchRequest, VideoBackend};
use crate::error::{DiscoveryError, Result};

const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];
const TRANSIENT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded", "backendError"];

/// Map a non-success Data API response onto the error taxonomy
pub fn classify_api_error(status: StatusCode, body: &str) -> DiscoveryError {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();
    let reasons: Vec<&str> = parsed
        .as_ref()
        .map(|p| p.error.errors.iter().map(|e| e.reason.as_str()).collect())
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .map(|p| p.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));

    if reasons.iter().any(|r| QUOTA_REASONS.contains(r))
        || (parsed.is_none() && body.contains("quotaExceeded"))
    {
        DiscoveryError::QuotaExceeded(message)
    } else if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || reasons.iter().any(|r| TRANSIENT_REASONS.contains(r))
    {
        DiscoveryError::Transient(message)
    } else {
        DiscoveryError::Backend(format!("{} ({})", message, status))
    }
}

fn normalized_base_url(base_url: &str) -> Result<Url> {
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| DiscoveryError::Configuration(format!("invalid YouTube base URL {}: {}", base_url, e)))
}

/// YouTube Data API v3 client bound to one API key
pub struct YouTubeClient {
    config: YouTubeConfig,
    api_key: String,
    base_url: Url,
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DiscoveryError::Configuration(e.to_string()))?;
        Self::with_client(config, api_key, client)
    }

    fn with_client(config: YouTubeConfig, api_key: String, client: reqwest::Client) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(DiscoveryError::Configuration("No API key provided".to_string()));
        }
        let base_url = normalized_base_url(&config.base_url)?;

        Ok(Self {
            config,
            api_key,
            base_url,
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self
            .base_url
            .join(resource)
            .map_err(|e| DiscoveryError::Configuration(e.to_string()))?;

        debug!("Requesting YouTube {} ({} params)", resource, params.len());

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(DiscoveryError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &text));
        }

        response.json().await.map_err(DiscoveryError::from_transport)
    }

    fn search_params(&self, request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("part", "id".to_string()),
            ("q", request.query.clone()),
            ("type", "video".to_string()),
            ("videoDuration", self.config.video_duration.clone()),
            ("maxResults", self.config.max_results.min(50).to_string()),
            ("safeSearch", self.config.safe_search.clone()),
            ("order", self.config.order.clone()),
        ];
        if let Some(language) = &self.config.relevance_language {
            params.push(("relevanceLanguage", language.clone()));
        }
        if let Some(region) = &self.config.region_code {
            params.push(("regionCode", region.clone()));
        }
        if let Some(token) = &request.page_token {
            params.push(("pageToken", token.clone()));
        }
        params
    }
}

#[async_trait]
impl VideoBackend for YouTubeClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let response: SearchListResponse = self.get_json("search", &self.search_params(request)).await?;

        let mut seen = HashSet::new();
        let video_ids = response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        Ok(SearchPage {
            video_ids,
            next_page_token: response.next_page_token,
        })
    }

    async fn list_videos(&self, ids: &[String]) -> Result<Vec<CandidateVideo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("part", "contentDetails,statistics,status,snippet".to_string()),
            ("id", ids.join(",")),
        ];
        let response: VideoListResponse = self.get_json("videos", &params).await?;
        Ok(response.items.into_iter().map(CandidateVideo::from).collect())
    }

    async fn list_channel_countries(&self, channel_ids: &[String]) -> Result<HashMap<String, String>> {
        if channel_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let params = [("part", "snippet".to_string()), ("id", channel_ids.join(","))];
        let response: ChannelListResponse = self.get_json("channels", &params).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|channel| {
                let country = channel.snippet?.country?;
                (!country.is_empty()).then(|| (channel.id, country))
            })
            .collect())
    }
}

/// Hands out [`YouTubeClient`]s that share one connection pool
pub struct YouTubeBackendFactory {
    config: YouTubeConfig,
    client: reqwest::Client,
}

impl YouTubeBackendFactory {
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        normalized_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DiscoveryError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }
}

impl BackendFactory for YouTubeBackendFactory {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn VideoBackend>> {
        let client = YouTubeClient::with_client(self.config.clone(), api_key.to_string(), self.client.clone())?;
        Ok(Arc::new(client))
    }
}
