//! Batched metadata and channel-country lookups

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use super::{CandidateVideo, VideoBackend, MAX_BATCH_SIZE};
use crate::error::Result;

pub struct MetadataFetcher {
    backend: Arc<dyn VideoBackend>,
    batch_size: usize,
}

impl MetadataFetcher {
    /// Batch size is clamped to `1..=MAX_BATCH_SIZE`
    pub fn new(backend: Arc<dyn VideoBackend>, batch_size: usize) -> Self {
        Self {
            backend,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    /// Fetch metadata for every id and attach the uploading channel's country.
    ///
    /// Any failed batch fails the whole fetch.
    pub async fn fetch(&self, ids: &[String]) -> Result<Vec<CandidateVideo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut videos = Vec::with_capacity(ids.len());
        for batch in ids.chunks(self.batch_size) {
            let mut fetched = self.backend.list_videos(batch).await?;
            debug!("Fetched metadata for {}/{} ids", fetched.len(), batch.len());
            videos.append(&mut fetched);
        }

        let countries = self.fetch_channel_countries(&videos).await?;
        for video in &mut videos {
            video.channel_country = countries.get(&video.channel_id).cloned();
        }

        Ok(videos)
    }

    async fn fetch_channel_countries(&self, videos: &[CandidateVideo]) -> Result<HashMap<String, String>> {
        let mut seen = HashSet::new();
        let channel_ids: Vec<String> = videos
            .iter()
            .filter(|v| !v.channel_id.is_empty())
            .filter(|v| seen.insert(v.channel_id.as_str()))
            .map(|v| v.channel_id.clone())
            .collect();

        let mut countries = HashMap::new();
        for batch in channel_ids.chunks(self.batch_size) {
            countries.extend(self.backend.list_channel_countries(batch).await?);
        }

        debug!("Resolved countries for {}/{} channels", countries.len(), channel_ids.len());
        Ok(countries)
    }
}
