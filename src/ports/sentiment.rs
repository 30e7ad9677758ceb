//! Sentiment Port
//!
//! Raw inputs for the sentiment aggregator. Each method is an independent
//! lookup; the aggregator clamps every value it receives.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{InstitutionalFlow, WhaleActivity};

#[derive(Error, Debug, Clone)]
pub enum SentimentError {
    #[error("Sentiment source '{0}' unavailable")]
    SourceUnavailable(String),

    #[error("No {metric} data for {symbol}")]
    NoData { symbol: String, metric: &'static str },

    #[error("Sentiment provider error: {0}")]
    Provider(String),
}

/// Sentiment inputs for one symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentPort: Send + Sync {
    /// Score of `source` for `symbol`, nominally -1..1
    async fn source_score(&self, symbol: &str, source: &str) -> Result<f64, SentimentError>;

    /// Fear/greed gauge, nominally 0..100
    async fn fear_greed_index(&self, symbol: &str) -> Result<f64, SentimentError>;

    async fn social_mentions(&self, symbol: &str) -> Result<u64, SentimentError>;

    async fn whale_activity(&self, symbol: &str) -> Result<WhaleActivity, SentimentError>;

    async fn institutional_flow(&self, symbol: &str) -> Result<InstitutionalFlow, SentimentError>;

    /// News tone, nominally -1..1
    async fn news_sentiment(&self, symbol: &str) -> Result<f64, SentimentError>;
}
