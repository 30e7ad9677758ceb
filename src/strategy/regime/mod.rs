//! Market Regime Detection Module
//!
//! Classifies the prevailing market regime from a reference series
//! (conventionally the most liquid asset):
//!
//! - **Volatility**: population standard deviation of close-to-close returns
//! - **Trend**: net return from the first to the last close
//!
//! Classification, first match wins:
//!
//! | Condition                        | Regime     | Confidence |
//! |----------------------------------|------------|------------|
//! | trend > 0.7 and volatility < 0.6 | bull       | 85         |
//! | trend < -0.7 and volatility > 0.4| bear       | 80         |
//! | volatility > 0.8                 | transition | 70         |
//! | otherwise                        | crab       | 0          |

use std::collections::HashMap;

use statrs::statistics::Statistics;

use crate::domain::{MarketRegime, PriceBar, Regime, RiskLevel, VolatilityLevel};
use crate::strategy::params::RegimeParams;

const BULL_TREND: f64 = 0.7;
const BULL_MAX_VOLATILITY: f64 = 0.6;
const BEAR_TREND: f64 = -0.7;
const BEAR_MIN_VOLATILITY: f64 = 0.4;
const TRANSITION_VOLATILITY: f64 = 0.8;

/// Volatility assumed when the reference series is too short
pub const NEUTRAL_VOLATILITY: f64 = 0.5;

/// Statistics a regime is classified from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeInputs {
    /// Signed net return over the window
    pub trend: f64,
    /// Standard deviation of per-bar returns
    pub volatility: f64,
}

impl RegimeInputs {
    pub const NEUTRAL: RegimeInputs = RegimeInputs {
        trend: 0.0,
        volatility: NEUTRAL_VOLATILITY,
    };
}

/// Pure classification of (trend, volatility) into a regime record
pub fn classify(trend: f64, volatility: f64) -> MarketRegime {
    let (regime, confidence, narrative) = if trend > BULL_TREND && volatility < BULL_MAX_VOLATILITY {
        (Regime::Bull, 85, "Strong uptrend with controlled volatility")
    } else if trend < BEAR_TREND && volatility > BEAR_MIN_VOLATILITY {
        (Regime::Bear, 80, "Bearish momentum with elevated volatility")
    } else if volatility > TRANSITION_VOLATILITY {
        (Regime::Transition, 70, "High volatility regime change in progress")
    } else {
        (Regime::Crab, 0, "Range-bound market")
    };

    let volatility_level = VolatilityLevel::from_volatility(volatility);

    MarketRegime {
        regime,
        confidence,
        volatility: volatility_level,
        trend_strength: trend.abs().min(1.0),
        dominant_narrative: narrative.to_string(),
        risk_level: RiskLevel::from(volatility_level),
    }
}

/// Population standard deviation of close-to-close returns.
///
/// Steps starting from a zero close carry no return and are skipped.
pub fn return_volatility(bars: &[PriceBar]) -> f64 {
    let returns: Vec<f64> = bars
        .windows(2)
        .filter(|w| w[0].close != 0.0)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect();

    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().population_std_dev()
}

/// (last close - first close) / first close
pub fn trend(bars: &[PriceBar]) -> f64 {
    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) if first.close != 0.0 => (last.close - first.close) / first.close,
        _ => 0.0,
    }
}

/// Regime classifier over a reference series
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    params: RegimeParams,
}

impl RegimeClassifier {
    pub fn new(params: RegimeParams) -> Self {
        Self { params }
    }

    /// Trend and volatility of `bars`, or `None` below `min_bars`
    pub fn inputs(&self, bars: &[PriceBar]) -> Option<RegimeInputs> {
        if bars.len() < self.params.min_bars {
            return None;
        }
        Some(RegimeInputs {
            trend: trend(bars),
            volatility: return_volatility(bars),
        })
    }

    /// Classify `bars`, falling back to the neutral inputs for short series
    pub fn detect(&self, bars: &[PriceBar]) -> MarketRegime {
        let inputs = self.inputs(bars).unwrap_or_else(|| {
            tracing::debug!(
                "Regime series has {} bars (need {}), using neutral inputs",
                bars.len(),
                self.params.min_bars
            );
            RegimeInputs::NEUTRAL
        });
        classify(inputs.trend, inputs.volatility)
    }

    /// Classify the market from the `reference` symbol's series in `market`
    pub fn detect_market(
        &self,
        market: &HashMap<String, Vec<PriceBar>>,
        reference: &str,
    ) -> MarketRegime {
        let bars = market.get(reference).map(Vec::as_slice).unwrap_or(&[]);
        self.detect(bars)
    }
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self::new(RegimeParams::default())
    }
}
