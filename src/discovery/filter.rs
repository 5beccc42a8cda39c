//! Admission filters and popularity ranking for candidate videos

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::classifier::{truncate, ClassifierOracle, ContentLabel};
use super::duration::parse_iso8601_seconds;
use super::CandidateVideo;
use crate::config::FilterConfig;
use crate::error::Result;

const AGE_RESTRICTED_RATING: &str = "ytAgeRestricted";

/// Why a candidate was not admitted
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    ExcludedCountry(String),
    NotPublic(String),
    NotProcessed(String),
    AgeRestricted,
    InvalidDuration(String),
    TooLong(f64),
    Unsuitable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ExcludedCountry(country) => write!(f, "channel country {} is excluded", country),
            Rejection::NotPublic(status) => write!(f, "privacy status is '{}'", status),
            Rejection::NotProcessed(status) => write!(f, "upload status is '{}'", status),
            Rejection::AgeRestricted => write!(f, "age restricted"),
            Rejection::InvalidDuration(raw) => write!(f, "unparsable duration '{}'", raw),
            Rejection::TooLong(seconds) => write!(f, "{:.1}s exceeds ceiling", seconds),
            Rejection::Unsuitable => write!(f, "classified as unsuitable"),
        }
    }
}

/// Ordered conjunction of admission predicates plus view-count ranking
#[derive(Clone)]
pub struct FilterPipeline {
    max_duration_seconds: f64,
    excluded_countries: HashSet<String>,
    classifier: Option<Arc<dyn ClassifierOracle>>,
}

impl FilterPipeline {
    pub fn new(config: &FilterConfig, classifier: Option<Arc<dyn ClassifierOracle>>) -> Self {
        Self {
            max_duration_seconds: config.max_duration_seconds,
            excluded_countries: config
                .excluded_countries
                .iter()
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
            classifier,
        }
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Predicates that need no external calls, cheapest first
    pub fn check_static(&self, video: &CandidateVideo) -> std::result::Result<(), Rejection> {
        if let Some(country) = &video.channel_country {
            let country = country.trim().to_uppercase();
            if self.excluded_countries.contains(&country) {
                return Err(Rejection::ExcludedCountry(country));
            }
        }

        if video.privacy_status != "public" {
            return Err(Rejection::NotPublic(video.privacy_status.clone()));
        }

        if video.upload_status != "processed" {
            return Err(Rejection::NotProcessed(video.upload_status.clone()));
        }

        if video.yt_rating.as_deref() == Some(AGE_RESTRICTED_RATING) {
            return Err(Rejection::AgeRestricted);
        }

        let seconds = match video.duration.as_deref() {
            None => 0.0,
            Some(raw) => parse_iso8601_seconds(raw)
                .ok_or_else(|| Rejection::InvalidDuration(raw.to_string()))?,
        };
        if seconds > self.max_duration_seconds {
            return Err(Rejection::TooLong(seconds));
        }

        Ok(())
    }

    /// Run every predicate against one candidate.
    ///
    /// The outer error is a classifier failure; the inner one is the
    /// admission verdict.
    pub async fn admit(
        &self,
        video: &CandidateVideo,
        query: Option<&str>,
    ) -> Result<std::result::Result<(), Rejection>> {
        if let Err(rejection) = self.check_static(video) {
            return Ok(Err(rejection));
        }

        let (Some(classifier), Some(query)) = (&self.classifier, query) else {
            return Ok(Ok(()));
        };
        if query.is_empty() || video.title.is_empty() {
            return Ok(Ok(()));
        }

        match classifier.classify(query, &video.title).await? {
            ContentLabel::Good => Ok(Ok(())),
            ContentLabel::Bad => Ok(Err(Rejection::Unsuitable)),
        }
    }

    /// Filter candidates and return admitted ids ranked by view count, descending.
    ///
    /// Duplicate ids keep their first occurrence. The sort is stable, so equal
    /// view counts keep input order.
    pub async fn filter(&self, candidates: &[CandidateVideo], query: Option<&str>) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut survivors: Vec<(&str, u64)> = Vec::new();

        for video in candidates {
            if !seen.insert(video.id.as_str()) {
                continue;
            }

            match self.admit(video, query).await? {
                Ok(()) => survivors.push((video.id.as_str(), video.view_count)),
                Err(rejection) => {
                    debug!("Skipping {} ({}): {}", video.id, truncate(&video.title, 50), rejection);
                }
            }
        }

        survivors.sort_by(|a, b| b.1.cmp(&a.1));

        info!("🎯 {} of {} candidates admitted", survivors.len(), candidates.len());
        Ok(survivors.into_iter().map(|(id, _)| id.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::error::DiscoveryError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn short(id: &str, views: u64) -> CandidateVideo {
        CandidateVideo {
            id: id.to_string(),
            title: format!("Video {}", id),
            channel_id: format!("UC{}", id),
            channel_country: Some("US".to_string()),
            privacy_status: "public".to_string(),
            upload_status: "processed".to_string(),
            yt_rating: None,
            duration: Some("PT30S".to_string()),
            view_count: views,
        }
    }

    fn pipeline() -> FilterPipeline {
        FilterPipeline::new(&FilterConfig::default(), None)
    }

    struct TitleOracle {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClassifierOracle for TitleOracle {
        async fn classify(&self, _query: &str, title: &str) -> Result<ContentLabel> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(if title.contains("bad") { ContentLabel::Bad } else { ContentLabel::Good })
        }
    }

    struct BrokenOracle;

    #[async_trait]
    impl ClassifierOracle for BrokenOracle {
        async fn classify(&self, _query: &str, _title: &str) -> Result<ContentLabel> {
            Err(DiscoveryError::Classification("model offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_ranks_by_view_count() {
        let candidates = vec![short("a", 10), short("b", 300), short("c", 20)];
        let ranked = pipeline().filter(&candidates, None).await.unwrap();
        assert_eq!(ranked, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let candidates = vec![short("a", 5), short("b", 5), short("c", 9), short("d", 5)];
        let ranked = pipeline().filter(&candidates, None).await.unwrap();
        assert_eq!(ranked, vec!["c", "a", "b", "d"]);
    }

    #[tokio::test]
    async fn test_duplicates_are_dropped() {
        let candidates = vec![short("a", 5), short("a", 500), short("b", 1)];
        let ranked = pipeline().filter(&candidates, None).await.unwrap();
        assert_eq!(ranked, vec!["a", "b"]);
    }

    #[test]
    fn test_duration_boundary() {
        let pipeline = pipeline();

        let mut at_ceiling = short("a", 1);
        at_ceiling.duration = Some("PT60S".to_string());
        assert!(pipeline.check_static(&at_ceiling).is_ok());

        let mut one_minute = short("b", 1);
        one_minute.duration = Some("PT1M".to_string());
        assert!(pipeline.check_static(&one_minute).is_ok());

        let mut just_over = short("c", 1);
        just_over.duration = Some("PT60.000001S".to_string());
        assert!(matches!(pipeline.check_static(&just_over), Err(Rejection::TooLong(_))));
    }

    #[test]
    fn test_missing_duration_counts_as_zero() {
        let mut video = short("a", 1);
        video.duration = None;
        assert!(pipeline().check_static(&video).is_ok());

        video.duration = Some("soon".to_string());
        assert_eq!(
            pipeline().check_static(&video),
            Err(Rejection::InvalidDuration("soon".to_string()))
        );
    }

    #[test]
    fn test_non_ascii_duration_is_rejected() {
        let mut video = short("a", 1);
        video.duration = Some("PT\u{0661}\u{0662}\u{0660}S".to_string());
        assert!(matches!(
            pipeline().check_static(&video),
            Err(Rejection::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_custom_excluded_countries() {
        let config = ConfigBuilder::new()
            .with_excluded_countries(vec!["br".to_string(), " ".to_string()])
            .build();
        let pipeline = FilterPipeline::new(&config.filter, None);

        let mut brazil = short("a", 1);
        brazil.channel_country = Some("BR".to_string());
        assert_eq!(
            pipeline.check_static(&brazil),
            Err(Rejection::ExcludedCountry("BR".to_string()))
        );

        let mut india = short("b", 1);
        india.channel_country = Some("IN".to_string());
        assert!(pipeline.check_static(&india).is_ok());
    }

    #[test]
    fn test_geographic_exclusion_is_case_insensitive() {
        let pipeline = pipeline();
        for country in ["IN", "in", "In", " in "] {
            let mut video = short("a", 1_000_000);
            video.channel_country = Some(country.to_string());
            assert_eq!(
                pipeline.check_static(&video),
                Err(Rejection::ExcludedCountry("IN".to_string()))
            );
        }

        let mut unknown = short("b", 1);
        unknown.channel_country = None;
        assert!(pipeline.check_static(&unknown).is_ok());
    }

    #[test]
    fn test_status_predicates() {
        let pipeline = pipeline();

        let mut unlisted = short("a", 1);
        unlisted.privacy_status = "unlisted".to_string();
        assert!(matches!(pipeline.check_static(&unlisted), Err(Rejection::NotPublic(_))));

        let mut uploading = short("b", 1);
        uploading.upload_status = "uploaded".to_string();
        assert!(matches!(pipeline.check_static(&uploading), Err(Rejection::NotProcessed(_))));

        let mut restricted = short("c", 1);
        restricted.yt_rating = Some("ytAgeRestricted".to_string());
        assert_eq!(pipeline.check_static(&restricted), Err(Rejection::AgeRestricted));
    }

    #[tokio::test]
    async fn test_classifier_rejects_bad_titles() {
        let oracle = Arc::new(TitleOracle { calls: AtomicUsize::new(0) });
        let pipeline = FilterPipeline::new(&FilterConfig::default(), Some(oracle.clone()));

        let mut bad = short("bad1", 999);
        bad.title = "bad clickbait".to_string();
        let mut long = short("long", 1);
        long.duration = Some("PT5M".to_string());
        let candidates = vec![short("a", 1), bad, long];

        let ranked = pipeline.filter(&candidates, Some("osmosis")).await.unwrap();
        assert_eq!(ranked, vec!["a"]);
        // The long video is rejected before reaching the classifier
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_classifier_skipped_without_query() {
        let oracle = Arc::new(TitleOracle { calls: AtomicUsize::new(0) });
        let pipeline = FilterPipeline::new(&FilterConfig::default(), Some(oracle.clone()));

        let mut bad = short("bad1", 1);
        bad.title = "bad".to_string();

        let ranked = pipeline.filter(&[bad.clone()], None).await.unwrap();
        assert_eq!(ranked, vec!["bad1"]);
        let ranked = pipeline.filter(&[bad], Some("")).await.unwrap();
        assert_eq!(ranked, vec!["bad1"]);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let pipeline = FilterPipeline::new(&FilterConfig::default(), Some(Arc::new(BrokenOracle)));
        let result = pipeline.filter(&[short("a", 1)], Some("osmosis")).await;
        assert!(matches!(result, Err(DiscoveryError::Classification(_))));
    }

    #[tokio::test]
    async fn test_classifier_absent_admits_everything_else() {
        let candidates: Vec<_> = (0..5).map(|i| short(&format!("v{}", i), i)).collect();
        let pipeline = pipeline();
        assert!(!pipeline.has_classifier());
        let ranked = pipeline.filter(&candidates, Some("osmosis")).await.unwrap();
        assert_eq!(ranked.len(), 5);
    }

    #[tokio::test]
    async fn test_filter_is_idempotent() {
        let mut candidates: Vec<_> = (0..20).map(|i| short(&format!("v{}", i), (i * 37) % 11)).collect();
        candidates[3].privacy_status = "private".to_string();
        candidates[7].channel_country = Some("in".to_string());

        let pipeline = pipeline();
        let first = pipeline.filter(&candidates, Some("q")).await.unwrap();
        let second = pipeline.filter(&candidates, Some("q")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_removing_a_candidate_keeps_relative_order() {
        let candidates: Vec<_> = (0..12).map(|i| short(&format!("v{}", i), (i * 7) % 4)).collect();
        let pipeline = pipeline();
        let full = pipeline.filter(&candidates, None).await.unwrap();

        for removed in 0..candidates.len() {
            let mut reduced = candidates.clone();
            let gone = reduced.remove(removed).id;
            let ranked = pipeline.filter(&reduced, None).await.unwrap();
            let expected: Vec<_> = full.iter().filter(|id| **id != gone).cloned().collect();
            assert_eq!(ranked, expected);
        }
    }
}
