//! Static Sentiment Source
//!
//! Serves sentiment inputs fixed in configuration. Every symbol receives the
//! same values; sources without a configured score are unavailable.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::config::SentimentSection;
use crate::domain::{InstitutionalFlow, WhaleActivity};
use crate::ports::{SentimentError, SentimentPort};

#[derive(Debug, Clone)]
pub struct StaticSentiment {
    scores: BTreeMap<String, f64>,
    fear_greed_index: f64,
    social_mentions: u64,
    whale_activity: WhaleActivity,
    institutional_flow: InstitutionalFlow,
    news_sentiment: f64,
}

impl StaticSentiment {
    pub fn new(scores: BTreeMap<String, f64>) -> Self {
        Self {
            scores,
            fear_greed_index: 50.0,
            social_mentions: 0,
            whale_activity: WhaleActivity::Neutral,
            institutional_flow: InstitutionalFlow::Neutral,
            news_sentiment: 0.0,
        }
    }

    pub fn with_fear_greed(mut self, index: f64) -> Self {
        self.fear_greed_index = index;
        self
    }

    pub fn with_flows(mut self, whales: WhaleActivity, institutions: InstitutionalFlow) -> Self {
        self.whale_activity = whales;
        self.institutional_flow = institutions;
        self
    }
}

impl From<&SentimentSection> for StaticSentiment {
    fn from(section: &SentimentSection) -> Self {
        Self {
            scores: section.scores.clone(),
            fear_greed_index: section.fear_greed_index,
            social_mentions: section.social_mentions,
            whale_activity: section.whale_activity,
            institutional_flow: section.institutional_flow,
            news_sentiment: section.news_sentiment,
        }
    }
}

#[async_trait]
impl SentimentPort for StaticSentiment {
    async fn source_score(&self, _symbol: &str, source: &str) -> Result<f64, SentimentError> {
        self.scores
            .get(source)
            .copied()
            .ok_or_else(|| SentimentError::SourceUnavailable(source.to_string()))
    }

    async fn fear_greed_index(&self, _symbol: &str) -> Result<f64, SentimentError> {
        Ok(self.fear_greed_index)
    }

    async fn social_mentions(&self, _symbol: &str) -> Result<u64, SentimentError> {
        Ok(self.social_mentions)
    }

    async fn whale_activity(&self, _symbol: &str) -> Result<WhaleActivity, SentimentError> {
        Ok(self.whale_activity)
    }

    async fn institutional_flow(&self, _symbol: &str) -> Result<InstitutionalFlow, SentimentError> {
        Ok(self.institutional_flow)
    }

    async fn news_sentiment(&self, _symbol: &str) -> Result<f64, SentimentError> {
        Ok(self.news_sentiment)
    }
}
