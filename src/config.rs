use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the video discovery service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Admission filter settings
    pub filter: FilterConfig,

    /// Content-safety classifier settings
    pub classifier: ClassifierConfig,

    /// Result cache settings
    pub cache: CacheConfig,

    /// Orchestration settings
    pub discovery: DiscoveryConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Server-side API key, used when a request does not carry its own
    pub api_key: Option<String>,

    /// Base URL of the Data API (overridable for testing and proxies)
    pub base_url: String,

    /// Results requested per search page (backend caps this at 50)
    pub max_results: u32,

    /// Optional suffix appended to every tag to bias towards Shorts
    pub query_suffix: Option<String>,

    /// `videoDuration` search filter
    pub video_duration: String,

    /// `relevanceLanguage` search hint
    pub relevance_language: Option<String>,

    /// `safeSearch` level
    pub safe_search: String,

    /// Result ordering
    pub order: String,

    /// Optional `regionCode` search hint
    pub region_code: Option<String>,

    /// Identifiers per `videos.list` / `channels.list` request
    pub batch_size: usize,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Short-form ceiling in seconds (inclusive)
    pub max_duration_seconds: f64,

    /// Channel country codes to reject, compared case-insensitively
    pub excluded_countries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inference endpoint of the content-safety model. None disables the check.
    pub endpoint: Option<String>,

    /// Optional model identifier forwarded to the endpoint
    pub model: Option<String>,

    /// Label the model emits for acceptable content
    pub good_label: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Persist results on disk; otherwise an in-process map is used
    pub enabled: bool,

    /// Cache directory
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Tags searched concurrently within one request (1 = sequential)
    pub max_concurrent_tags: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level / filter directive
    pub level: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3/".to_string(),
            max_results: 50,
            query_suffix: None,
            video_duration: "short".to_string(),
            relevance_language: Some("en".to_string()),
            safe_search: "moderate".to_string(),
            order: "relevance".to_string(),
            region_code: None,
            batch_size: 50,
            timeout_seconds: 30,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_duration_seconds: 60.0,
            excluded_countries: vec!["IN".to_string()],
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            good_label: "LABEL_1".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: std::env::temp_dir().join("youtube_cache"),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { max_concurrent_tags: 1 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "videofinder=info,tower_http=info,warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, falling back to
    /// defaults, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = [
            "videofinder.toml",
            "config/videofinder.toml",
            "/etc/videofinder/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config.with_env_overrides())
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(api_key) = std::env::var("YOUTUBE_API_KEY") {
            if !api_key.trim().is_empty() {
                self.youtube.api_key = Some(api_key);
            }
        }

        if let Ok(endpoint) = std::env::var("CONTENT_FILTER_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.classifier.endpoint = Some(endpoint);
            }
        }

        if let Ok(cache_dir) = std::env::var("VIDEOFINDER_CACHE_DIR") {
            self.cache.dir = PathBuf::from(cache_dir);
        }

        if let Ok(port) = std::env::var("VIDEOFINDER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid VIDEOFINDER_PORT: {}", port),
            }
        }

        if let Ok(log_level) = std::env::var("VIDEOFINDER_LOG_LEVEL") {
            self.logging.level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.youtube.max_results == 0 || self.youtube.max_results > 50 {
            return Err(anyhow!("youtube.max_results must be between 1 and 50"));
        }

        if self.youtube.batch_size == 0 || self.youtube.batch_size > 50 {
            return Err(anyhow!("youtube.batch_size must be between 1 and 50"));
        }

        if url::Url::parse(&self.youtube.base_url).is_err() {
            return Err(anyhow!("youtube.base_url is not a valid URL: {}", self.youtube.base_url));
        }

        let max_duration = self.filter.max_duration_seconds;
        if max_duration.is_nan() || max_duration <= 0.0 {
            return Err(anyhow!("filter.max_duration_seconds must be greater than 0"));
        }

        if self.discovery.max_concurrent_tags == 0 {
            return Err(anyhow!("discovery.max_concurrent_tags must be greater than 0"));
        }

        if let Some(endpoint) = &self.classifier.endpoint {
            if url::Url::parse(endpoint).is_err() {
                return Err(anyhow!("classifier.endpoint is not a valid URL: {}", endpoint));
            }
        }

        if self.youtube.api_key.is_none() {
            tracing::warn!("⚠️ No server-side YouTube API key configured; requests must supply api_key");
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "videofinder configuration:\n\
            - Listen: {}:{}\n\
            - Server API key: {}\n\
            - Max duration: {}s\n\
            - Excluded countries: {}\n\
            - Classifier: {}\n\
            - Cache: {}\n\
            - Concurrent tags: {}",
            self.server.host,
            self.server.port,
            if self.youtube.api_key.is_some() { "configured" } else { "not configured" },
            self.filter.max_duration_seconds,
            self.filter.excluded_countries.join(", "),
            self.classifier.endpoint.as_deref().unwrap_or("disabled"),
            if self.cache.enabled {
                self.cache.dir.display().to_string()
            } else {
                "in-memory".to_string()
            },
            self.discovery.max_concurrent_tags
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.youtube.api_key = Some(api_key);
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.config.youtube.base_url = base_url;
        self
    }

    pub fn with_query_suffix(mut self, suffix: String) -> Self {
        self.config.youtube.query_suffix = Some(suffix);
        self
    }

    pub fn with_max_duration(mut self, seconds: f64) -> Self {
        self.config.filter.max_duration_seconds = seconds;
        self
    }

    pub fn with_excluded_countries(mut self, countries: Vec<String>) -> Self {
        self.config.filter.excluded_countries = countries;
        self
    }

    pub fn with_classifier_endpoint(mut self, endpoint: String) -> Self {
        self.config.classifier.endpoint = Some(endpoint);
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.config.cache.dir = dir;
        self
    }

    pub fn enable_cache(mut self, enable: bool) -> Self {
        self.config.cache.enabled = enable;
        self
    }

    pub fn with_max_concurrent_tags(mut self, tags: usize) -> Self {
        self.config.discovery.max_concurrent_tags = tags;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filter.max_duration_seconds, 60.0);
        assert_eq!(config.filter.excluded_countries, vec!["IN".to_string()]);
        assert_eq!(config.youtube.max_results, 50);
        assert_eq!(config.classifier.good_label, "LABEL_1");
        assert!(config.classifier.endpoint.is_none());
        assert!(config.cache.dir.ends_with("youtube_cache"));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_api_key("key".to_string())
            .with_max_duration(30.0)
            .with_max_concurrent_tags(4)
            .enable_cache(false)
            .build();

        assert_eq!(config.youtube.api_key.as_deref(), Some("key"));
        assert_eq!(config.filter.max_duration_seconds, 30.0);
        assert_eq!(config.discovery.max_concurrent_tags, 4);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let config = ConfigBuilder::new().with_max_concurrent_tags(0).build();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.youtube.batch_size = 51;
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_classifier_endpoint("not a url".to_string())
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [filter]
            excluded_countries = ["IN", "PK"]

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.filter.excluded_countries.len(), 2);
        assert_eq!(config.filter.max_duration_seconds, 60.0);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.youtube.safe_search, "moderate");
    }

    #[test]
    fn test_toml_roundtrip_through_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("videofinder.toml");
        let path = path.to_str().unwrap();

        let config = ConfigBuilder::new().with_port(9000).build();
        config.save(path).unwrap();

        let loaded: Config = toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded.server.port, 9000);
    }
}
