//! YouTube Data API v3 backend
//!
//! Implements the discovery backend capability over the `search`, `videos`
//! and `channels` endpoints.

pub mod client;
pub mod models;

pub use client::{classify_api_error, YouTubeBackendFactory, YouTubeClient};
