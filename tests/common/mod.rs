#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use videofinder::config::FilterConfig;
use videofinder::discovery::{
    BackendFactory, CacheStore, CandidateVideo, ClassifierOracle, ContentLabel, Discovery, FilterPipeline,
    MemoryCacheStore, SearchPage, SearchRequest, VideoBackend,
};
use videofinder::error::{DiscoveryError, Result};

/// Scripted in-memory video backend that counts every call
#[derive(Default)]
pub struct MockYouTube {
    pages: Mutex<HashMap<String, SearchPage>>,
    failures: Mutex<HashMap<String, DiscoveryError>>,
    videos: Mutex<HashMap<String, CandidateVideo>>,
    countries: Mutex<HashMap<String, String>>,
    pub requests: Mutex<Vec<SearchRequest>>,
    pub keys: Mutex<Vec<String>>,
    pub search_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
    pub channel_calls: AtomicUsize,
}

impl MockYouTube {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register the candidates a query returns, in backend order
    pub fn add_results(&self, query: &str, videos: Vec<CandidateVideo>, next_page_token: Option<&str>) {
        let page = SearchPage {
            video_ids: videos.iter().map(|v| v.id.clone()).collect(),
            next_page_token: next_page_token.map(str::to_string),
        };
        let mut store = self.videos.lock().unwrap();
        for video in videos {
            store.insert(video.id.clone(), video);
        }
        self.pages.lock().unwrap().insert(query.to_string(), page);
    }

    pub fn fail_search(&self, query: &str, error: DiscoveryError) {
        self.failures.lock().unwrap().insert(query.to_string(), error);
    }

    pub fn set_country(&self, channel_id: &str, country: &str) {
        self.countries
            .lock()
            .unwrap()
            .insert(channel_id.to_string(), country.to_string());
    }

    pub fn total_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
            + self.video_calls.load(Ordering::SeqCst)
            + self.channel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoBackend for MockYouTube {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(err) = self.failures.lock().unwrap().get(&request.query) {
            return Err(err.clone());
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&request.query)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_videos(&self, ids: &[String]) -> Result<Vec<CandidateVideo>> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        let store = self.videos.lock().unwrap();
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn list_channel_countries(&self, channel_ids: &[String]) -> Result<HashMap<String, String>> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        let countries = self.countries.lock().unwrap();
        Ok(channel_ids
            .iter()
            .filter_map(|id| countries.get(id).map(|c| (id.clone(), c.clone())))
            .collect())
    }
}

pub struct MockFactory(pub Arc<MockYouTube>);

impl BackendFactory for MockFactory {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn VideoBackend>> {
        self.0.keys.lock().unwrap().push(api_key.to_string());
        Ok(self.0.clone())
    }
}

/// Flags titles containing any of the given words
pub struct KeywordClassifier {
    pub bad_words: Vec<&'static str>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl KeywordClassifier {
    pub fn new(bad_words: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            bad_words,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            bad_words: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ClassifierOracle for KeywordClassifier {
    async fn classify(&self, _query: &str, title: &str) -> Result<ContentLabel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DiscoveryError::Classification("inference endpoint returned 503".to_string()));
        }
        let lowered = title.to_lowercase();
        if self.bad_words.iter().any(|w| lowered.contains(w)) {
            Ok(ContentLabel::Bad)
        } else {
            Ok(ContentLabel::Good)
        }
    }
}

/// A public, processed 30 second short
pub fn short(id: &str, title: &str, views: u64) -> CandidateVideo {
    CandidateVideo {
        id: id.to_string(),
        title: title.to_string(),
        channel_id: format!("UC_{}", id),
        channel_country: None,
        privacy_status: "public".to_string(),
        upload_status: "processed".to_string(),
        yt_rating: None,
        duration: Some("PT30S".to_string()),
        view_count: views,
    }
}

pub fn discovery_with(
    mock: &Arc<MockYouTube>,
    cache: Arc<dyn CacheStore>,
    classifier: Option<Arc<dyn ClassifierOracle>>,
) -> Discovery {
    let pipeline = FilterPipeline::new(&FilterConfig::default(), classifier);
    Discovery::new(Arc::new(MockFactory(mock.clone())), cache, pipeline)
}

pub fn discovery(mock: &Arc<MockYouTube>) -> Discovery {
    discovery_with(mock, Arc::new(MemoryCacheStore::new()), None)
}

pub fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
