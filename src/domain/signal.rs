use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest confidence any signal may carry
pub const MAX_CONFIDENCE: u8 = 95;

/// Directional call of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl SignalKind {
    pub fn is_buy_family(&self) -> bool {
        matches!(self, Self::Buy | Self::StrongBuy)
    }

    pub fn is_sell_family(&self) -> bool {
        matches!(self, Self::Sell | Self::StrongSell)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::StrongBuy => write!(f, "STRONG_BUY"),
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Hold => write!(f, "HOLD"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// Bar interval a signal was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    /// Reduction of several timeframes into one call
    #[serde(rename = "consensus")]
    Consensus,
}

impl Timeframe {
    /// Timeframes analysed when nothing else is configured
    pub const DEFAULT_SET: [Timeframe; 6] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::Consensus => "consensus",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown timeframe: {0}")]
pub struct ParseTimeframeError(pub String);

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Timeframe::M1),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            "consensus" => Ok(Timeframe::Consensus),
            other => Err(ParseTimeframeError(other.to_string())),
        }
    }
}

/// MACD-like reading: direction of EMA12 - EMA26 and its magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    /// +1 bullish, -1 bearish, 0 when there was not enough data
    pub direction: i8,
    /// |EMA12 - EMA26|
    pub histogram: f64,
}

impl MacdReading {
    pub const NEUTRAL: MacdReading = MacdReading { direction: 0, histogram: 0.0 };
}

/// Short-run vs long-run volume classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeProfile {
    Accumulation,
    Distribution,
    Neutral,
}

impl fmt::Display for VolumeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeProfile::Accumulation => write!(f, "accumulation"),
            VolumeProfile::Distribution => write!(f, "distribution"),
            VolumeProfile::Neutral => write!(f, "neutral"),
        }
    }
}

/// Lowest low and highest high over the analysis window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

/// Indicator values a signal was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: MacdReading,
    pub volume_profile: VolumeProfile,
    pub support_resistance: SupportResistance,
}

/// A directional trading call for one symbol on one timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub kind: SignalKind,
    /// 0-100, never above [`MAX_CONFIDENCE`]
    pub confidence: u8,
    pub timeframe: Timeframe,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub risk_reward_ratio: f64,
    pub reasoning: Vec<String>,
    pub patterns: Vec<String>,
    pub indicators: IndicatorSnapshot,
}

impl Signal {
    /// |target - entry| / |entry - stop|, 0 when the stop sits on the entry
    pub fn risk_reward(entry: f64, target: f64, stop: f64) -> f64 {
        let risk = (entry - stop).abs();
        if risk < f64::EPSILON {
            return 0.0;
        }
        (target - entry).abs() / risk
    }

    /// Checks the record-level invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.confidence > MAX_CONFIDENCE {
            return Err(format!("Invalid confidence value: {}", self.confidence));
        }

        let sr = &self.indicators.support_resistance;
        if sr.support > sr.resistance {
            return Err(format!(
                "Support {} above resistance {}",
                sr.support, sr.resistance
            ));
        }

        if !self.entry_price.is_finite()
            || !self.target_price.is_finite()
            || !self.stop_loss.is_finite()
        {
            return Err("Prices must be finite".to_string());
        }

        Ok(())
    }

    pub fn is_consensus(&self) -> bool {
        self.timeframe == Timeframe::Consensus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_signal() -> Signal {
        Signal {
            symbol: "SOL".to_string(),
            kind: SignalKind::Buy,
            confidence: 65,
            timeframe: Timeframe::H1,
            entry_price: 100.0,
            target_price: 105.0,
            stop_loss: 98.0,
            risk_reward_ratio: Signal::risk_reward(100.0, 105.0, 98.0),
            reasoning: vec!["RSI oversold at 25.0".to_string()],
            patterns: Vec::new(),
            indicators: IndicatorSnapshot {
                rsi: 25.0,
                macd: MacdReading::NEUTRAL,
                volume_profile: VolumeProfile::Neutral,
                support_resistance: SupportResistance { support: 90.0, resistance: 110.0 },
            },
        }
    }

    #[test]
    fn test_risk_reward() {
        assert_relative_eq!(Signal::risk_reward(100.0, 105.0, 98.0), 2.5, epsilon = 1e-9);
        assert_relative_eq!(Signal::risk_reward(100.0, 94.0, 103.0), 2.0, epsilon = 1e-9);
        assert_eq!(Signal::risk_reward(100.0, 105.0, 100.0), 0.0);
    }

    #[test]
    fn test_kind_families() {
        assert!(SignalKind::StrongBuy.is_buy_family());
        assert!(SignalKind::Buy.is_buy_family());
        assert!(!SignalKind::Hold.is_buy_family());
        assert!(!SignalKind::Hold.is_sell_family());
        assert!(SignalKind::StrongSell.is_sell_family());
    }

    #[test]
    fn test_timeframe_parse_and_display() {
        for tf in Timeframe::DEFAULT_SET {
            assert_eq!(tf.as_str().parse::<Timeframe>(), Ok(tf));
        }
        assert_eq!(Timeframe::Consensus.to_string(), "consensus");
        assert!("2h".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SignalKind::StrongSell).unwrap();
        assert_eq!(json, "\"STRONG_SELL\"");
        let json = serde_json::to_string(&Timeframe::M15).unwrap();
        assert_eq!(json, "\"15m\"");
        let json = serde_json::to_string(&VolumeProfile::Accumulation).unwrap();
        assert_eq!(json, "\"accumulation\"");
    }

    #[test]
    fn test_signal_validation() {
        let valid = sample_signal();
        assert!(valid.validate().is_ok());

        let mut over = sample_signal();
        over.confidence = 96;
        assert!(over.validate().is_err());

        let mut inverted = sample_signal();
        inverted.indicators.support_resistance = SupportResistance { support: 120.0, resistance: 110.0 };
        assert!(inverted.validate().is_err());

        let mut nan_price = sample_signal();
        nan_price.target_price = f64::NAN;
        assert!(nan_price.validate().is_err());
    }
}
