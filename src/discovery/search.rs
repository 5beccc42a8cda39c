//! Query construction over the video backend

use std::sync::Arc;
use tracing::info;

use super::{SearchPage, SearchRequest, VideoBackend};
use crate::error::Result;

pub struct SearchClient {
    backend: Arc<dyn VideoBackend>,
    query_suffix: Option<String>,
}

impl SearchClient {
    pub fn new(backend: Arc<dyn VideoBackend>, query_suffix: Option<String>) -> Self {
        Self { backend, query_suffix }
    }

    /// Backend query for a tag: the tag itself plus the optional suffix
    pub fn build_query(&self, tag: &str) -> String {
        match self.query_suffix.as_deref().map(str::trim) {
            Some(suffix) if !suffix.is_empty() => format!("{} {}", tag, suffix),
            _ => tag.to_string(),
        }
    }

    /// One page of candidates for a tag. No auto-pagination.
    pub async fn search(&self, tag: &str, page_token: Option<&str>) -> Result<SearchPage> {
        let request = SearchRequest {
            query: self.build_query(tag),
            page_token: page_token.map(str::to_string),
        };

        info!("🔍 Searching for: {}", request.query);
        let page = self.backend.search(&request).await?;
        info!("Found {} candidates for '{}'", page.video_ids.len(), tag);
        Ok(page)
    }
}
