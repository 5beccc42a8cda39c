//! Error taxonomy for video discovery
//!
//! Every failure that can reach a caller carries a machine-readable code
//! (see [`DiscoveryError::code`]) next to its human message, so HTTP clients
//! can branch on `quota_exceeded` without parsing text.

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Error types for discovery operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// Missing or unusable credential / settings. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The video backend reported quota exhaustion for the current window.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network fault, timeout or 5xx from a backend. Safe to retry.
    #[error("Transient backend error: {0}")]
    Transient(String),

    /// Any other backend failure, including malformed responses.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Content classifier error: {0}")]
    Classification(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl DiscoveryError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            DiscoveryError::Configuration(_) => "configuration_error",
            DiscoveryError::QuotaExceeded(_) => "quota_exceeded",
            DiscoveryError::Transient(_) => "transient_backend_error",
            DiscoveryError::Backend(_) => "backend_error",
            DiscoveryError::Classification(_) => "classification_error",
            DiscoveryError::Cache(_) => "cache_error",
        }
    }

    /// Whether an immediate retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        matches!(self, DiscoveryError::Transient(_))
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, DiscoveryError::QuotaExceeded(_))
    }

    /// Classify a transport-level reqwest failure.
    ///
    /// Timeouts and connection problems are transient; body decoding
    /// failures mean the backend sent something we cannot use.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            DiscoveryError::Transient(err.to_string())
        } else if err.is_decode() {
            DiscoveryError::Backend(format!("malformed response: {}", err))
        } else if let Some(status) = err.status() {
            if status.is_server_error() {
                DiscoveryError::Transient(err.to_string())
            } else {
                DiscoveryError::Backend(err.to_string())
            }
        } else {
            DiscoveryError::Backend(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DiscoveryError::QuotaExceeded("x".into()).code(), "quota_exceeded");
        assert_eq!(DiscoveryError::Transient("x".into()).code(), "transient_backend_error");
        assert_eq!(DiscoveryError::Configuration("x".into()).code(), "configuration_error");
        assert_eq!(DiscoveryError::Cache("x".into()).code(), "cache_error");
    }

    #[test]
    fn test_retry_policy() {
        assert!(DiscoveryError::Transient("timeout".into()).is_retryable());
        assert!(!DiscoveryError::QuotaExceeded("daily".into()).is_retryable());
        assert!(!DiscoveryError::Backend("bad request".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_message() {
        let err = DiscoveryError::QuotaExceeded("daily limit".to_string());
        assert_eq!(err.to_string(), "YouTube API quota exceeded: daily limit");
    }
}
