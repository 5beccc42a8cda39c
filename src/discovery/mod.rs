//! Video discovery pipeline
//!
//! Takes topic tags, searches the video backend, fetches metadata, runs the
//! admission filters, ranks by popularity and caches each page of results.

pub mod cache;
pub mod classifier;
pub mod duration;
pub mod filter;
pub mod metadata;
pub mod orchestrator;
pub mod search;

// Re-export main types
pub use cache::{cache_key, CacheStore, CachedPage, FileCacheStore, MemoryCacheStore};
pub use classifier::{create_classifier, retain_good_titles, ClassifierOracle, ContentLabel, HttpClassifier};
pub use filter::{FilterPipeline, Rejection};
pub use metadata::MetadataFetcher;
pub use orchestrator::{Discovery, DiscoveryResult, TagOutcome};
pub use search::SearchClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Upper bound on identifiers per metadata request imposed by the backend
pub const MAX_BATCH_SIZE: usize = 50;

/// A candidate video with the metadata the admission filters need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CandidateVideo {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    /// ISO country of the uploading channel, filled by the channel pass
    pub channel_country: Option<String>,
    /// `public`, `unlisted` or `private`
    pub privacy_status: String,
    /// `processed` once transcoding finished
    pub upload_status: String,
    /// `ytRating` from the content rating block, if any
    pub yt_rating: Option<String>,
    /// Raw ISO-8601 duration, e.g. `PT45S`
    pub duration: Option<String>,
    pub view_count: u64,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Candidate ids, unique, in backend order
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Search parameters for one backend request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub page_token: Option<String>,
}

/// Capability interface over the external video backend
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Run a single search request (one page)
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;

    /// Fetch metadata for at most [`MAX_BATCH_SIZE`] ids
    async fn list_videos(&self, ids: &[String]) -> Result<Vec<CandidateVideo>>;

    /// Resolve channel id to country code for at most [`MAX_BATCH_SIZE`] channels.
    /// Channels without a declared country are omitted.
    async fn list_channel_countries(&self, channel_ids: &[String]) -> Result<HashMap<String, String>>;
}

/// Builds a backend bound to a caller-supplied credential
pub trait BackendFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<std::sync::Arc<dyn VideoBackend>>;
}
