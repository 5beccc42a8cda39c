//! Per-tag discovery coordinator
//!
//! For each tag: cache check, search, metadata fetch, filter, cache populate,
//! then aggregation across tags. Failures stay confined to their tag.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::cache::{CacheStore, CachedPage, FileCacheStore, MemoryCacheStore};
use super::classifier::create_classifier;
use super::filter::FilterPipeline;
use super::metadata::MetadataFetcher;
use super::search::SearchClient;
use super::{BackendFactory, MAX_BATCH_SIZE};
use crate::config::Config;
use crate::error::{DiscoveryError, Result};
use crate::youtube::YouTubeBackendFactory;

/// What happened for a single tag
#[derive(Debug, Clone, PartialEq)]
pub struct TagOutcome {
    pub tag: String,
    /// Ranked ids contributed by this tag (empty on failure)
    pub videos: Vec<String>,
    /// This tag's own continuation cursor
    pub next_page_token: Option<String>,
    /// Served from cache without touching the backend
    pub cached: bool,
    pub error: Option<DiscoveryError>,
}

impl TagOutcome {
    fn success(tag: &str, page: CachedPage, cached: bool) -> Self {
        Self {
            tag: tag.to_string(),
            videos: page.videos,
            next_page_token: page.next_page_token,
            cached,
            error: None,
        }
    }

    fn failure(tag: &str, error: DiscoveryError) -> Self {
        Self {
            tag: tag.to_string(),
            videos: Vec::new(),
            next_page_token: None,
            cached: false,
            error: Some(error),
        }
    }
}

/// Aggregated result of a multi-tag discovery request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryResult {
    /// Ranked ids of every tag in tag order, without duplicates
    pub videos: Vec<String>,
    /// Last non-null cursor in tag order
    pub next_page_token: Option<String>,
    pub tags: Vec<TagOutcome>,
}

impl DiscoveryResult {
    fn aggregate(outcomes: Vec<TagOutcome>) -> Self {
        let mut seen = HashSet::new();
        let mut videos = Vec::new();
        let mut next_page_token = None;

        for outcome in &outcomes {
            for id in &outcome.videos {
                if seen.insert(id.as_str()) {
                    videos.push(id.clone());
                }
            }
            if outcome.next_page_token.is_some() {
                next_page_token = outcome.next_page_token.clone();
            }
        }

        Self {
            videos,
            next_page_token,
            tags: outcomes,
        }
    }

    /// The request-level error, reported only when every tag failed.
    /// Quota exhaustion wins over other errors so callers can defer retries.
    pub fn failure(&self) -> Option<&DiscoveryError> {
        if self.tags.is_empty() || self.tags.iter().any(|t| t.error.is_none()) {
            return None;
        }

        let errors: Vec<&DiscoveryError> = self.tags.iter().filter_map(|t| t.error.as_ref()).collect();
        errors
            .iter()
            .copied()
            .find(|e| e.is_quota_exceeded())
            .or_else(|| errors.first().copied())
    }

    pub fn failed_tags(&self) -> usize {
        self.tags.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Discovery orchestrator
pub struct Discovery {
    backends: Arc<dyn BackendFactory>,
    cache: Arc<dyn CacheStore>,
    pipeline: FilterPipeline,
    query_suffix: Option<String>,
    batch_size: usize,
    max_concurrent_tags: usize,
}

impl Discovery {
    pub fn new(backends: Arc<dyn BackendFactory>, cache: Arc<dyn CacheStore>, pipeline: FilterPipeline) -> Self {
        Self {
            backends,
            cache,
            pipeline,
            query_suffix: None,
            batch_size: MAX_BATCH_SIZE,
            max_concurrent_tags: 1,
        }
    }

    /// Wire up the YouTube backend, cache and classifier from configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let backends = Arc::new(YouTubeBackendFactory::new(config.youtube.clone())?);

        let cache: Arc<dyn CacheStore> = if config.cache.enabled {
            let store = FileCacheStore::new(config.cache.dir.clone());
            if let Err(e) = store.initialize().await {
                warn!("Cache directory unavailable, writes will fail: {}", e);
            }
            Arc::new(store)
        } else {
            info!("💭 Disk cache disabled, using in-memory cache");
            Arc::new(MemoryCacheStore::new())
        };

        let classifier = create_classifier(&config.classifier)?;
        let pipeline = FilterPipeline::new(&config.filter, classifier);
        if pipeline.has_classifier() {
            info!("🛡️ Content classifier enabled");
        }

        Ok(Self::new(backends, cache, pipeline)
            .with_query_suffix(config.youtube.query_suffix.clone())
            .with_batch_size(config.youtube.batch_size)
            .with_max_concurrent_tags(config.discovery.max_concurrent_tags))
    }

    pub fn with_query_suffix(mut self, suffix: Option<String>) -> Self {
        self.query_suffix = suffix;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_concurrent_tags(mut self, max: usize) -> Self {
        self.max_concurrent_tags = max.max(1);
        self
    }

    /// Discover shorts for every tag.
    ///
    /// Only a missing credential fails the call; per-tag failures are
    /// reported in [`DiscoveryResult::tags`].
    pub async fn discover(&self, tags: &[String], page_token: Option<&str>, api_key: &str) -> Result<DiscoveryResult> {
        if api_key.trim().is_empty() {
            return Err(DiscoveryError::Configuration("No API key provided".to_string()));
        }

        let backend = self.backends.connect(api_key)?;
        let search = SearchClient::new(backend.clone(), self.query_suffix.clone());
        let fetcher = MetadataFetcher::new(backend, self.batch_size);

        // Futures are built up front so the stream borrows nothing higher-ranked
        let pending: Vec<_> = tags
            .iter()
            .map(|tag| self.discover_tag(&search, &fetcher, tag, page_token))
            .collect();
        let outcomes: Vec<TagOutcome> = stream::iter(pending)
            .buffered(self.max_concurrent_tags)
            .collect()
            .await;

        let result = DiscoveryResult::aggregate(outcomes);
        info!(
            "✅ Discovery finished: {} videos from {} tags ({} failed)",
            result.videos.len(),
            result.tags.len(),
            result.failed_tags()
        );
        Ok(result)
    }

    async fn discover_tag(
        &self,
        search: &SearchClient,
        fetcher: &MetadataFetcher,
        tag: &str,
        page_token: Option<&str>,
    ) -> TagOutcome {
        if tag.trim().is_empty() {
            return TagOutcome::failure(tag, DiscoveryError::Configuration("No tag provided".to_string()));
        }

        if let Some(page) = self.cache.get(tag, page_token).await {
            return TagOutcome::success(tag, page, true);
        }

        match self.fetch_page(search, fetcher, tag, page_token).await {
            Ok(page) => {
                if let Err(e) = self.cache.put(tag, page_token, &page).await {
                    warn!("Failed to cache results for '{}': {}", tag, e);
                }
                info!("Found {} videos for {}", page.videos.len(), tag);
                TagOutcome::success(tag, page, false)
            }
            Err(e) => {
                match &e {
                    DiscoveryError::QuotaExceeded(_) => warn!("⛔ Quota exceeded while searching '{}'", tag),
                    DiscoveryError::Transient(_) => warn!("Transient error searching '{}': {}", tag, e),
                    _ => error!("Error searching '{}': {}", tag, e),
                }
                TagOutcome::failure(tag, e)
            }
        }
    }

    async fn fetch_page(
        &self,
        search: &SearchClient,
        fetcher: &MetadataFetcher,
        tag: &str,
        page_token: Option<&str>,
    ) -> Result<CachedPage> {
        let page = search.search(tag, page_token).await?;
        let candidates = fetcher.fetch(&page.video_ids).await?;
        let ranked = self.pipeline.filter(&candidates, Some(tag)).await?;
        Ok(CachedPage::new(ranked, page.next_page_token))
    }
}
