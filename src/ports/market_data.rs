//! Market Data Port
//!
//! Source of historical bar series per symbol and timeframe.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PriceBar, SeriesError, Timeframe};

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No data for {symbol} {timeframe}")]
    NotFound { symbol: String, timeframe: Timeframe },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Invalid series for {symbol} {timeframe}: {source}")]
    InvalidSeries {
        symbol: String,
        timeframe: Timeframe,
        #[source]
        source: SeriesError,
    },
}

/// Market data port trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch the bar series for `symbol` at `timeframe`, oldest first.
    ///
    /// Implementations validate the series before returning it.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}
