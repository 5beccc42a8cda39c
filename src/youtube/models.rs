//! YouTube Data API v3 wire types

use serde::Deserialize;

use crate::discovery::CandidateVideo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

/// Search hits can be videos, channels or playlists; only videos carry `videoId`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    pub content_details: Option<ContentDetails>,
    pub status: Option<VideoStatus>,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub duration: Option<String>,
    pub content_rating: Option<ContentRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRating {
    pub yt_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    #[serde(default)]
    pub privacy_status: String,
    #[serde(default)]
    pub upload_status: String,
}

/// Counters arrive as decimal strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelSnippet {
    pub country: Option<String>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub reason: String,
}

impl From<VideoItem> for CandidateVideo {
    fn from(item: VideoItem) -> Self {
        let (title, channel_id) = item
            .snippet
            .map(|s| (s.title, s.channel_id))
            .unwrap_or_default();
        let (privacy_status, upload_status) = item
            .status
            .map(|s| (s.privacy_status, s.upload_status))
            .unwrap_or_default();
        let (duration, yt_rating) = match item.content_details {
            Some(details) => (
                details.duration,
                details.content_rating.and_then(|r| r.yt_rating),
            ),
            None => (None, None),
        };
        let view_count = item
            .statistics
            .and_then(|s| s.view_count)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        CandidateVideo {
            id: item.id,
            title,
            channel_id,
            channel_country: None,
            privacy_status,
            upload_status,
            yt_rating,
            duration,
            view_count,
        }
    }
}
