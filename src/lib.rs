//! Video Finder - Rust Implementation
//!
//! Finds short educational videos for topic tags: searches YouTube, filters
//! candidates for suitability, ranks them by popularity and caches each page.

pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::discovery::{
    cache_key, CacheStore, CachedPage, ClassifierOracle, ContentLabel, Discovery, DiscoveryResult, FileCacheStore,
    FilterPipeline, MemoryCacheStore, TagOutcome, VideoBackend,
};
pub use crate::error::{DiscoveryError, Result};
pub use crate::youtube::{YouTubeBackendFactory, YouTubeClient};
