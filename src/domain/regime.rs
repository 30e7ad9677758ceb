//! Market Regime Records
//!
//! Coarse classification of the overall market trend/volatility state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prevailing market regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Bull,
    Bear,
    /// Range-bound, sideways market
    Crab,
    /// High volatility regime change in progress
    Transition,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Bull => write!(f, "bull"),
            Regime::Bear => write!(f, "bear"),
            Regime::Crab => write!(f, "crab"),
            Regime::Transition => write!(f, "transition"),
        }
    }
}

/// Banded return volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl VolatilityLevel {
    /// >0.8 extreme, >0.6 high, >0.4 medium, else low
    pub fn from_volatility(volatility: f64) -> Self {
        if volatility > 0.8 {
            Self::Extreme
        } else if volatility > 0.6 {
            Self::High
        } else if volatility > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Risk level reported alongside a regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl From<VolatilityLevel> for RiskLevel {
    /// Extreme and high carry over; everything calmer is still medium risk
    fn from(level: VolatilityLevel) -> Self {
        match level {
            VolatilityLevel::Extreme => RiskLevel::Extreme,
            VolatilityLevel::High => RiskLevel::High,
            VolatilityLevel::Medium | VolatilityLevel::Low => RiskLevel::Medium,
        }
    }
}

/// Global market regime record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub regime: Regime,
    /// 0-100
    pub confidence: u8,
    pub volatility: VolatilityLevel,
    /// Magnitude of the net return over the window, 0-1
    pub trend_strength: f64,
    pub dominant_narrative: String,
    pub risk_level: RiskLevel,
}
