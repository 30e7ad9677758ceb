//! Engine Parameters
//!
//! Tunables for signal generation, consensus, regime detection and
//! sentiment aggregation. Defaults reproduce the reference thresholds.

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Timeframes analysed per symbol, in output order
    pub timeframes: Vec<Timeframe>,
    /// Symbol whose series drives regime classification
    pub reference_symbol: String,
    pub signals: SignalParams,
    pub consensus: ConsensusParams,
    pub regime: RegimeParams,
    pub sentiment: SentimentParams,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            timeframes: Timeframe::DEFAULT_SET.to_vec(),
            reference_symbol: "BTC".to_string(),
            signals: SignalParams::default(),
            consensus: ConsensusParams::default(),
            regime: RegimeParams::default(),
            sentiment: SentimentParams::default(),
        }
    }
}

impl EngineParams {
    /// Replace the analysed timeframes
    pub fn with_timeframes(mut self, timeframes: Vec<Timeframe>) -> Self {
        self.timeframes = timeframes;
        self
    }

    /// Replace the regime reference symbol
    pub fn with_reference_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.reference_symbol = symbol.into();
        self
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.timeframes.is_empty() {
            return Err(ParamsError::NoTimeframes);
        }
        if self.timeframes.contains(&Timeframe::Consensus) {
            return Err(ParamsError::ConsensusTimeframe);
        }
        if self.reference_symbol.is_empty() {
            return Err(ParamsError::EmptyReferenceSymbol);
        }
        self.signals.validate()?;
        self.consensus.validate()?;
        self.regime.validate()?;
        self.sentiment.validate()?;
        Ok(())
    }
}

/// Per-timeframe signal generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Bars required before a timeframe produces a signal
    pub min_bars: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Trailing window for support/resistance
    pub sr_window: usize,
    /// Average true range period for target/stop bands
    pub atr_period: usize,
    /// Target distance in ATRs before clamping
    pub target_atr_multiple: f64,
    /// Stop distance in ATRs before clamping
    pub stop_atr_multiple: f64,
    pub target_min_pct: f64,
    pub target_max_pct: f64,
    pub stop_min_pct: f64,
    pub stop_max_pct: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            min_bars: 50,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            sr_window: 50,
            atr_period: 14,
            target_atr_multiple: 3.0,
            stop_atr_multiple: 1.5,
            target_min_pct: 0.03,
            target_max_pct: 0.08,
            stop_min_pct: 0.02,
            stop_max_pct: 0.04,
        }
    }
}

impl SignalParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        // MACD needs 26 closes, RSI needs period + 1
        if self.min_bars < 26 || self.min_bars <= self.rsi_period {
            return Err(ParamsError::InvalidMinBars(self.min_bars));
        }
        if self.rsi_period == 0 {
            return Err(ParamsError::InvalidPeriod("rsi_period", self.rsi_period));
        }
        if self.sr_window == 0 {
            return Err(ParamsError::InvalidPeriod("sr_window", self.sr_window));
        }
        if self.atr_period == 0 {
            return Err(ParamsError::InvalidPeriod("atr_period", self.atr_period));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(ParamsError::InvalidRsiBands(self.rsi_oversold, self.rsi_overbought));
        }
        if self.target_atr_multiple <= 0.0 || self.stop_atr_multiple <= 0.0 {
            return Err(ParamsError::InvalidAtrMultiple);
        }
        if self.target_min_pct <= 0.0 || self.target_min_pct > self.target_max_pct {
            return Err(ParamsError::InvalidBand("target", self.target_min_pct, self.target_max_pct));
        }
        if self.stop_min_pct <= 0.0 || self.stop_min_pct > self.stop_max_pct || self.stop_max_pct >= 1.0 {
            return Err(ParamsError::InvalidBand("stop", self.stop_min_pct, self.stop_max_pct));
        }
        Ok(())
    }
}

/// Multi-timeframe consensus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    /// Fewest per-timeframe signals worth reducing
    pub min_signals: usize,
    /// Share of signals the dominant kind must reach (inclusive)
    pub min_agreement: f64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            min_signals: 3,
            min_agreement: 0.6,
        }
    }
}

impl ConsensusParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_signals == 0 {
            return Err(ParamsError::InvalidPeriod("min_signals", self.min_signals));
        }
        if self.min_agreement <= 0.0 || self.min_agreement > 1.0 {
            return Err(ParamsError::InvalidAgreement(self.min_agreement));
        }
        Ok(())
    }
}

/// Regime detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeParams {
    /// Bars required before the reference series is classified
    pub min_bars: usize,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self { min_bars: 20 }
    }
}

impl RegimeParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_bars < 2 {
            return Err(ParamsError::InvalidPeriod("regime.min_bars", self.min_bars));
        }
        Ok(())
    }
}

/// Sentiment aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentParams {
    /// Social sources averaged into the overall score
    pub sources: Vec<String>,
}

impl Default for SentimentParams {
    fn default() -> Self {
        Self {
            sources: ["twitter", "reddit", "discord", "telegram"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SentimentParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(ParamsError::EmptySourceName);
        }
        Ok(())
    }
}

/// Parameter validation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParamsError {
    #[error("At least one timeframe must be configured")]
    NoTimeframes,
    #[error("'consensus' cannot be analysed as a timeframe")]
    ConsensusTimeframe,
    #[error("Reference symbol cannot be empty")]
    EmptyReferenceSymbol,
    #[error("Invalid min_bars: {0} (must cover MACD's 26 closes and the RSI period)")]
    InvalidMinBars(usize),
    #[error("Invalid {0}: {1} (must be > 0)")]
    InvalidPeriod(&'static str, usize),
    #[error("Invalid RSI bands: oversold {0}, overbought {1}")]
    InvalidRsiBands(f64, f64),
    #[error("ATR multiples must be > 0")]
    InvalidAtrMultiple,
    #[error("Invalid {0} band: {1} - {2}")]
    InvalidBand(&'static str, f64, f64),
    #[error("Invalid consensus agreement: {0} (must be 0 < share <= 1)")]
    InvalidAgreement(f64),
    #[error("Sentiment source names cannot be empty")]
    EmptySourceName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = EngineParams::default();
        assert_eq!(params.timeframes.len(), 6);
        assert_eq!(params.reference_symbol, "BTC");
        assert_eq!(params.signals.min_bars, 50);
        assert_eq!(params.consensus.min_signals, 3);
        assert_eq!(params.consensus.min_agreement, 0.6);
        assert_eq!(params.regime.min_bars, 20);
        assert_eq!(params.sentiment.sources.len(), 4);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_builder() {
        let params = EngineParams::default()
            .with_timeframes(vec![Timeframe::H1, Timeframe::D1])
            .with_reference_symbol("ETH");
        assert_eq!(params.timeframes, vec![Timeframe::H1, Timeframe::D1]);
        assert_eq!(params.reference_symbol, "ETH");
    }

    #[test]
    fn test_consensus_timeframe_rejected() {
        let params = EngineParams::default().with_timeframes(vec![Timeframe::Consensus]);
        assert!(matches!(params.validate(), Err(ParamsError::ConsensusTimeframe)));

        let params = EngineParams::default().with_timeframes(Vec::new());
        assert!(matches!(params.validate(), Err(ParamsError::NoTimeframes)));
    }

    #[test]
    fn test_invalid_min_bars() {
        let mut signals = SignalParams::default();
        signals.min_bars = 20;
        assert!(matches!(signals.validate(), Err(ParamsError::InvalidMinBars(20))));
    }

    #[test]
    fn test_invalid_rsi_bands() {
        let mut signals = SignalParams::default();
        signals.rsi_oversold = 80.0;
        assert!(matches!(signals.validate(), Err(ParamsError::InvalidRsiBands(_, _))));
    }

    #[test]
    fn test_invalid_bands() {
        let mut signals = SignalParams::default();
        signals.target_min_pct = 0.1;
        assert!(matches!(signals.validate(), Err(ParamsError::InvalidBand("target", _, _))));

        let mut signals = SignalParams::default();
        signals.stop_max_pct = 1.5;
        assert!(matches!(signals.validate(), Err(ParamsError::InvalidBand("stop", _, _))));
    }

    #[test]
    fn test_consensus_validation() {
        let mut consensus = ConsensusParams::default();
        assert!(consensus.validate().is_ok());

        consensus.min_agreement = 1.2;
        assert!(consensus.validate().is_err());
    }

    #[test]
    fn test_sentiment_validation() {
        let mut sentiment = SentimentParams::default();
        sentiment.sources.push("  ".to_string());
        assert!(matches!(sentiment.validate(), Err(ParamsError::EmptySourceName)));
    }
}
