//! Sentiment Aggregation
//!
//! Combines per-source scores and the independent sub-lookups from a
//! [`SentimentPort`] into one [`SentimentAnalysis`]. Lookups run
//! concurrently. A failed source drops out of the breakdown and the mean;
//! a failed sub-lookup falls back to its neutral value.

use std::collections::BTreeMap;

use crate::domain::{InstitutionalFlow, SentimentAnalysis, WhaleActivity};
use crate::ports::SentimentPort;
use crate::strategy::params::SentimentParams;

const NEUTRAL_FEAR_GREED: u8 = 50;

/// Aggregates sentiment inputs for a symbol
#[derive(Debug, Clone)]
pub struct SentimentAggregator {
    params: SentimentParams,
}

impl SentimentAggregator {
    pub fn new(params: SentimentParams) -> Self {
        Self { params }
    }

    pub fn sources(&self) -> &[String] {
        &self.params.sources
    }

    /// Build the composite record for `symbol`
    pub async fn analyze(&self, symbol: &str, port: &dyn SentimentPort) -> SentimentAnalysis {
        let (sources, fear_greed, mentions, whales, flow, news) = tokio::join!(
            self.collect_sources(symbol, port),
            port.fear_greed_index(symbol),
            port.social_mentions(symbol),
            port.whale_activity(symbol),
            port.institutional_flow(symbol),
            port.news_sentiment(symbol),
        );

        let fear_greed_index = match fear_greed {
            Ok(v) if v.is_finite() => v.clamp(0.0, 100.0).round() as u8,
            Ok(v) => {
                tracing::warn!("{} fear/greed index not finite ({}), using neutral", symbol, v);
                NEUTRAL_FEAR_GREED
            }
            Err(e) => {
                tracing::warn!("{} fear/greed lookup failed: {}", symbol, e);
                NEUTRAL_FEAR_GREED
            }
        };

        let social_mentions = mentions.unwrap_or_else(|e| {
            tracing::warn!("{} social mentions lookup failed: {}", symbol, e);
            0
        });

        let whale_activity = whales.unwrap_or_else(|e| {
            tracing::warn!("{} whale activity lookup failed: {}", symbol, e);
            WhaleActivity::Neutral
        });

        let institutional_flow = flow.unwrap_or_else(|e| {
            tracing::warn!("{} institutional flow lookup failed: {}", symbol, e);
            InstitutionalFlow::Neutral
        });

        let news_sentiment = match news {
            Ok(v) => clamp_unit(v),
            Err(e) => {
                tracing::warn!("{} news sentiment lookup failed: {}", symbol, e);
                0.0
            }
        };

        let overall_sentiment = if sources.is_empty() {
            0.0
        } else {
            clamp_unit(sources.values().sum::<f64>() / sources.len() as f64)
        };

        tracing::debug!(
            "{} sentiment {:.2} from {}/{} sources, fear/greed {}",
            symbol,
            overall_sentiment,
            sources.len(),
            self.params.sources.len(),
            fear_greed_index
        );

        SentimentAnalysis {
            overall_sentiment,
            fear_greed_index,
            social_mentions,
            whale_activity,
            institutional_flow,
            news_sentiment,
            sources,
        }
    }

    async fn collect_sources(&self, symbol: &str, port: &dyn SentimentPort) -> BTreeMap<String, f64> {
        let mut scores = BTreeMap::new();
        for source in &self.params.sources {
            match port.source_score(symbol, source).await {
                Ok(score) if score.is_finite() => {
                    scores.insert(source.clone(), clamp_unit(score));
                }
                Ok(score) => {
                    tracing::warn!("{} source {} returned non-finite score {}", symbol, source, score);
                }
                Err(e) => {
                    tracing::warn!("{} source {} failed: {}", symbol, source, e);
                }
            }
        }
        scores
    }
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new(SentimentParams::default())
    }
}

/// Clamp into -1..1; non-finite values collapse to 0
fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
