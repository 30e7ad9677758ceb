//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - Market data feeds (OHLCV bar series)
//! - Sentiment inputs (social sources, fear/greed, flows)

pub mod market_data;
pub mod sentiment;

pub use market_data::{MarketDataError, MarketDataPort};
pub use sentiment::{SentimentError, SentimentPort};

#[cfg(test)]
pub use market_data::MockMarketDataPort;
#[cfg(test)]
pub use sentiment::MockSentimentPort;
