//! JSON File Market Data
//!
//! Serves bar series from `{data_dir}/{SYMBOL}_{timeframe}.json`, each file
//! holding a JSON array of bars:
//!
//! ```json
//! [{"timestamp": "2024-01-01T00:00:00Z", "open": 1.0, "high": 1.1,
//!   "low": 0.9, "close": 1.05, "volume": 1200.0}]
//! ```
//!
//! Series are validated before they are returned.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{validate_series, PriceBar, Timeframe};
use crate::ports::{MarketDataError, MarketDataPort};

/// File-backed market data feed
#[derive(Debug, Clone)]
pub struct JsonFileMarketData {
    data_dir: PathBuf,
}

impl JsonFileMarketData {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `symbol` at `timeframe`
    pub fn series_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}.json", symbol.to_uppercase(), timeframe.as_str()))
    }
}

#[async_trait]
impl MarketDataPort for JsonFileMarketData {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let path = self.series_path(symbol, timeframe);

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MarketDataError::NotFound {
                    symbol: symbol.to_string(),
                    timeframe,
                }
            } else {
                MarketDataError::Io {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;

        let bars: Vec<PriceBar> = serde_json::from_str(&content)
            .map_err(|e| MarketDataError::ParseError(format!("{}: {}", path.display(), e)))?;

        validate_series(&bars).map_err(|source| MarketDataError::InvalidSeries {
            symbol: symbol.to_string(),
            timeframe,
            source,
        })?;

        tracing::debug!("Loaded {} {} bars from {}", bars.len(), timeframe, path.display());
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesError;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_bars(n: usize) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                PriceBar::new(start + Duration::hours(i as i64), c, c + 1.0, c - 1.0, c, 500.0)
            })
            .collect()
    }

    fn write_series(dir: &TempDir, name: &str, bars: &[PriceBar]) {
        let json = serde_json::to_string(bars).unwrap();
        std::fs::write(dir.path().join(name), json).unwrap();
    }

    #[tokio::test]
    async fn test_reads_series_file() {
        let dir = TempDir::new().unwrap();
        write_series(&dir, "SOL_1h.json", &sample_bars(5));
        let feed = JsonFileMarketData::new(dir.path());

        let bars = feed.fetch_bars("sol", Timeframe::H1).await.unwrap();
        assert_eq!(bars, sample_bars(5));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let feed = JsonFileMarketData::new(dir.path());

        let result = feed.fetch_bars("SOL", Timeframe::D1).await;
        assert!(matches!(
            result,
            Err(MarketDataError::NotFound { timeframe: Timeframe::D1, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("SOL_5m.json"), "{not json").unwrap();
        let feed = JsonFileMarketData::new(dir.path());

        let result = feed.fetch_bars("SOL", Timeframe::M5).await;
        assert!(matches!(result, Err(MarketDataError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_unordered_series_rejected() {
        let dir = TempDir::new().unwrap();
        let mut bars = sample_bars(4);
        bars.swap(1, 2);
        write_series(&dir, "ETH_15m.json", &bars);
        let feed = JsonFileMarketData::new(dir.path());

        match feed.fetch_bars("ETH", Timeframe::M15).await {
            Err(MarketDataError::InvalidSeries { source, .. }) => {
                assert_eq!(source, SeriesError::NonMonotonic { index: 2 });
            }
            other => panic!("expected InvalidSeries, got {:?}", other),
        }
    }

    #[test]
    fn test_series_path() {
        let feed = JsonFileMarketData::new("/data");
        assert_eq!(
            feed.series_path("btc", Timeframe::M1),
            PathBuf::from("/data/BTC_1m.json")
        );
    }
}
