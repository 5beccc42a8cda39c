//! Result caching keyed by (tag, page token) fingerprint

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{DiscoveryError, Result};

/// Stand-in for an absent page token when deriving keys
pub const FIRST_PAGE_SENTINEL: &str = "first";

/// Derive the storage key for a (tag, page token) pair.
///
/// md5 over `"{tag}:{token or 'first'}"`, hex encoded. Pure and stable across
/// restarts, so files written by earlier runs stay addressable.
pub fn cache_key(tag: &str, page_token: Option<&str>) -> String {
    let key = format!("{}:{}", tag, page_token.unwrap_or(FIRST_PAGE_SENTINEL));
    format!("{:x}", md5::compute(key.as_bytes()))
}

/// A cached, already filtered page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedPage {
    /// Ranked video ids
    pub videos: Vec<String>,
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CachedPage {
    pub fn new(videos: Vec<String>, next_page_token: Option<String>) -> Self {
        Self {
            videos,
            next_page_token,
            tag: None,
            page_token: None,
            cached_at: None,
        }
    }
}

/// Key-value capability for filtered result pages.
///
/// `get` never fails: unreadable entries are misses. `put` reports failures so
/// the caller can log them, but callers must not let them affect results.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, tag: &str, page_token: Option<&str>) -> Option<CachedPage>;

    async fn put(&self, tag: &str, page_token: Option<&str>, page: &CachedPage) -> Result<()>;
}

/// One JSON file per key in a shared directory. No expiry.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create the cache directory
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| DiscoveryError::Cache(format!("{}: {}", self.cache_dir.display(), e)))?;
        info!("📁 Video cache directory initialized: {}", self.cache_dir.display());
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    async fn read_entry(&self, path: &Path) -> Option<CachedPage> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CachedPage>(&content) {
            Ok(page) => Some(page),
            Err(e) => {
                warn!("Failed to parse cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn json_entries(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(paths),
            Err(e) => return Err(DiscoveryError::Cache(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DiscoveryError::Cache(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }

        Ok(paths)
    }

    /// Look up an entry by its raw key
    pub async fn get_by_key(&self, key: &str) -> Option<CachedPage> {
        self.read_entry(&self.entry_path(key)).await
    }

    /// Remove the entry for a (tag, page token) pair
    pub async fn invalidate(&self, tag: &str, page_token: Option<&str>) -> Result<bool> {
        self.invalidate_key(&cache_key(tag, page_token)).await
    }

    /// Remove an entry by its raw key
    pub async fn invalidate_key(&self, key: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => {
                info!("🗑️ Invalidated cache entry: {}", key);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache file not found for key: {}", key);
                Ok(false)
            }
            Err(e) => Err(DiscoveryError::Cache(e.to_string())),
        }
    }

    /// Remove every cached entry
    pub async fn clear_all(&self) -> Result<usize> {
        let mut cleared_count = 0;

        for path in self.json_entries().await? {
            if tokio::fs::remove_file(&path).await.is_ok() {
                cleared_count += 1;
                debug!("🗑️ Removed cache file: {}", path.display());
            }
        }

        if cleared_count > 0 {
            info!("🧹 Cleared {} cache files", cleared_count);
        }

        Ok(cleared_count)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();

        for path in self.json_entries().await? {
            stats.total_files += 1;
            if let Ok(meta) = tokio::fs::metadata(&path).await {
                stats.total_bytes += meta.len();
            }
            match self.read_entry(&path).await {
                Some(page) => {
                    stats.valid_files += 1;
                    stats.total_videos += page.videos.len();
                }
                None => stats.unreadable_files += 1,
            }
        }

        Ok(stats)
    }

    /// List cached entries, newest first when timestamps are known
    pub async fn list_entries(&self) -> Result<Vec<CacheEntryInfo>> {
        let mut entries = Vec::new();

        for path in self.json_entries().await? {
            let Some(page) = self.read_entry(&path).await else {
                continue;
            };
            let key = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            entries.push(CacheEntryInfo {
                key,
                tag: page.tag,
                page_token: page.page_token,
                video_count: page.videos.len(),
                has_next_page: page.next_page_token.is_some(),
                cached_at: page.cached_at,
            });
        }

        entries.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        Ok(entries)
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, tag: &str, page_token: Option<&str>) -> Option<CachedPage> {
        let key = cache_key(tag, page_token);
        let page = self.read_entry(&self.entry_path(&key)).await?;
        info!("📚 Cache hit for '{}' ({} videos)", tag, page.videos.len());
        Some(page)
    }

    async fn put(&self, tag: &str, page_token: Option<&str>, page: &CachedPage) -> Result<()> {
        let key = cache_key(tag, page_token);
        let record = CachedPage {
            tag: Some(tag.to_string()),
            page_token: page_token.map(str::to_string),
            cached_at: Some(chrono::Utc::now()),
            ..page.clone()
        };

        let json_content = serde_json::to_string(&record)
            .map_err(|e| DiscoveryError::Cache(e.to_string()))?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| DiscoveryError::Cache(format!("{}: {}", self.cache_dir.display(), e)))?;

        let path = self.entry_path(&key);
        tokio::fs::write(&path, json_content)
            .await
            .map_err(|e| DiscoveryError::Cache(format!("{}: {}", path.display(), e)))?;

        debug!("💾 Cached {} videos for '{}' under {}", page.videos.len(), tag, key);
        Ok(())
    }
}

/// In-process cache with the same keying, used when disk caching is off
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, tag: &str, page_token: Option<&str>) -> Option<CachedPage> {
        let entries = self.entries.read().await;
        entries.get(&cache_key(tag, page_token)).cloned()
    }

    async fn put(&self, tag: &str, page_token: Option<&str>, page: &CachedPage) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(cache_key(tag, page_token), page.clone());
        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub total_files: usize,
    pub valid_files: usize,
    pub unreadable_files: usize,
    pub total_videos: usize,
    pub total_bytes: u64,
}

/// Summary of one cached entry
#[derive(Debug, Clone)]
pub struct CacheEntryInfo {
    pub key: String,
    pub tag: Option<String>,
    pub page_token: Option<String>,
    pub video_count: usize,
    pub has_next_page: bool,
    pub cached_at: Option<chrono::DateTime<chrono::Utc>>,
}
