//! API data models

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::discovery::TagOutcome;
use crate::error::DiscoveryError;

pub const QUOTA_MESSAGE: &str = "YouTube API quota exceeded. Please try again tomorrow.";

/// Query string of `GET /api/videos`
#[derive(Debug, Default, Deserialize)]
pub struct VideoQuery {
    pub tag: Option<String>,
    pub page_token: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    pub tag: String,
    pub videos: Vec<String>,
    pub count: usize,
    pub next_page_token: Option<String>,
}

/// Body of `POST /api/videos/discover`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DiscoverRequest {
    #[serde(default)]
    pub tags: Vec<String>,
    pub page_token: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub videos: Vec<String>,
    pub count: usize,
    pub next_page_token: Option<String>,
    pub tags: Vec<TagReport>,
}

/// Per-tag section of a discover response
#[derive(Debug, Serialize, Deserialize)]
pub struct TagReport {
    pub tag: String,
    pub videos: Vec<String>,
    pub next_page_token: Option<String>,
    pub cached: bool,
    pub error: Option<ErrorBody>,
}

impl From<TagOutcome> for TagReport {
    fn from(outcome: TagOutcome) -> Self {
        Self {
            tag: outcome.tag,
            videos: outcome.videos,
            next_page_token: outcome.next_page_token,
            cached: outcome.cached,
            error: outcome.error.as_ref().map(ErrorBody::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&DiscoveryError> for ErrorBody {
    fn from(err: &DiscoveryError) -> Self {
        let message = if err.is_quota_exceeded() {
            QUOTA_MESSAGE.to_string()
        } else {
            err.to_string()
        };
        Self {
            error: err.code().to_string(),
            message: Some(message),
        }
    }
}

/// Error response with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn no_tag() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "No tag provided".to_string(),
                message: None,
            },
        }
    }

    pub fn missing_api_key() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "missing_api_key".to_string(),
                message: Some("No YouTube API key provided and none configured on the server".to_string()),
            },
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        let status = match &err {
            DiscoveryError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            DiscoveryError::Configuration(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody::from(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_maps_to_429() {
        let err = ApiError::from(DiscoveryError::QuotaExceeded("daily limit".into()));
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.body.error, "quota_exceeded");
        assert_eq!(err.body.message.as_deref(), Some(QUOTA_MESSAGE));
    }

    #[test]
    fn test_other_errors_carry_code() {
        let err = ApiError::from(DiscoveryError::Transient("timeout".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "transient_backend_error");

        let err = ApiError::from(DiscoveryError::Configuration("bad key".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_tag_body_shape() {
        let value = serde_json::to_value(ApiError::no_tag().body).unwrap();
        assert_eq!(value, serde_json::json!({"error": "No tag provided"}));
    }
}
