//! Sentiment Records
//!
//! Composite multi-source sentiment for one symbol.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Large-holder behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhaleActivity {
    Accumulating,
    Distributing,
    Neutral,
}

/// Direction of institutional money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstitutionalFlow {
    Inflow,
    Outflow,
    Neutral,
}

/// Aggregated sentiment for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    /// Mean of the per-source scores, -1..1
    pub overall_sentiment: f64,
    /// 0 = extreme fear, 100 = extreme greed
    pub fear_greed_index: u8,
    pub social_mentions: u64,
    pub whale_activity: WhaleActivity,
    pub institutional_flow: InstitutionalFlow,
    /// -1..1
    pub news_sentiment: f64,
    /// Source name -> score in -1..1
    pub sources: BTreeMap<String, f64>,
}

impl SentimentAnalysis {
    /// Record with every field at its neutral value
    pub fn neutral() -> Self {
        Self {
            overall_sentiment: 0.0,
            fear_greed_index: 50,
            social_mentions: 0,
            whale_activity: WhaleActivity::Neutral,
            institutional_flow: InstitutionalFlow::Neutral,
            news_sentiment: 0.0,
            sources: BTreeMap::new(),
        }
    }

    /// True when every field lies within its documented range
    pub fn in_range(&self) -> bool {
        let unit = |v: f64| (-1.0..=1.0).contains(&v);
        unit(self.overall_sentiment)
            && self.fear_greed_index <= 100
            && unit(self.news_sentiment)
            && self.sources.values().all(|v| unit(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_in_range() {
        let s = SentimentAnalysis::neutral();
        assert!(s.in_range());
        assert_eq!(s.fear_greed_index, 50);
        assert!(s.sources.is_empty());
    }

    #[test]
    fn test_out_of_range_source_detected() {
        let mut s = SentimentAnalysis::neutral();
        s.sources.insert("twitter".to_string(), 1.5);
        assert!(!s.in_range());
    }
}
