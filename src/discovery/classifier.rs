use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ClassifierConfig;
use crate::error::{DiscoveryError, Result};

/// Binary verdict of the content-safety oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLabel {
    Good,
    Bad,
}

/// Opaque classifier: (query, title) in, label out
#[async_trait]
pub trait ClassifierOracle: Send + Sync {
    async fn classify(&self, query: &str, title: &str) -> Result<ContentLabel>;
}

/// Create the configured classifier, or `None` when no endpoint is set
pub fn create_classifier(config: &ClassifierConfig) -> Result<Option<Arc<dyn ClassifierOracle>>> {
    match &config.endpoint {
        Some(_) => Ok(Some(Arc::new(HttpClassifier::new(config.clone())?))),
        None => {
            info!("🔕 Content classifier not configured, safety check disabled");
            Ok(None)
        }
    }
}

/// Keep only the titles the oracle labels good
pub async fn retain_good_titles(
    oracle: &dyn ClassifierOracle,
    query: &str,
    titles: &[String],
) -> Result<Vec<String>> {
    let mut good_titles = Vec::new();
    for title in titles {
        match oracle.classify(query, title).await? {
            ContentLabel::Good => good_titles.push(title.clone()),
            ContentLabel::Bad => debug!("Skipping bad content: {}", truncate(title, 50)),
        }
    }
    Ok(good_titles)
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Text-classification inference server client.
///
/// Sends `{"inputs": "<query> [SEP] <title>"}` and reads the top label from a
/// `[{"label", "score"}]` (or nested `[[...]]`) response.
pub struct HttpClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

impl ClassifyResponse {
    fn top_label(self) -> Option<LabelScore> {
        let scores = match self {
            ClassifyResponse::Flat(scores) => scores,
            ClassifyResponse::Nested(batches) => batches.into_iter().next()?,
        };
        scores
            .into_iter()
            .reduce(|best, next| if next.score > best.score { next } else { best })
    }
}

impl HttpClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.endpoint.is_none() {
            return Err(DiscoveryError::Configuration(
                "classifier endpoint not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DiscoveryError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn input_text(query: &str, title: &str) -> String {
        format!("{} [SEP] {}", query, title)
    }
}

#[async_trait]
impl ClassifierOracle for HttpClassifier {
    async fn classify(&self, query: &str, title: &str) -> Result<ContentLabel> {
        let endpoint = self
            .config
            .endpoint
            .as_ref()
            .ok_or_else(|| DiscoveryError::Configuration("classifier endpoint not configured".to_string()))?;

        let request = ClassifyRequest {
            inputs: Self::input_text(query, title),
            model: self.config.model.as_deref(),
        };

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DiscoveryError::Classification(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::Classification(format!(
                "classifier returned {}: {}",
                status, text
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| DiscoveryError::Classification(format!("malformed response: {}", e)))?;

        let top = parsed
            .top_label()
            .ok_or_else(|| DiscoveryError::Classification("empty classifier response".to_string()))?;

        if top.label == self.config.good_label {
            Ok(ContentLabel::Good)
        } else {
            Ok(ContentLabel::Bad)
        }
    }
}
