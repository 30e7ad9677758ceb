//! Price Bars
//!
//! OHLCV bar type consumed by every engine component, plus boundary
//! validation for series arriving from external data feeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One OHLCV observation for a fixed time interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self { timestamp, open, high, low, close, volume }
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Validate OHLC data integrity
    pub fn is_valid(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
            && self.high >= self.low
            && self.volume >= 0.0
    }
}

/// Series rejected at the boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Bar {index} has invalid OHLCV values")]
    InvalidBar { index: usize },
    #[error("Bar {index} has negative volume {volume}")]
    NegativeVolume { index: usize, volume: f64 },
    #[error("Bar {index} timestamp is not after the previous bar")]
    NonMonotonic { index: usize },
}

/// Check that a series is ordered, duplicate-free and well-formed.
///
/// The engine assumes validated input; adapters call this before handing
/// bars over.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), SeriesError> {
    for (index, bar) in bars.iter().enumerate() {
        if bar.volume < 0.0 {
            return Err(SeriesError::NegativeVolume { index, volume: bar.volume });
        }
        if !bar.is_valid() {
            return Err(SeriesError::InvalidBar { index });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(SeriesError::NonMonotonic { index });
        }
    }
    Ok(())
}

/// Volume column of a bar series, in order
pub fn volumes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Close column of a bar series, in order
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
