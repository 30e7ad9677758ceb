//! Indicator Library
//!
//! Stateless technical indicators evaluated over the trailing window of a
//! bar series:
//! - RSI: simple-average relative strength over the last `period` changes
//! - EMA / MACD-like direction: EMA(12) vs EMA(26) over their own windows
//! - Volume profile: short-run vs long-run mean volume
//! - Support/resistance: lowest low / highest high over a window
//! - ATR: mean true range, used to size target and stop bands
//!
//! Every function degrades to a neutral value when the window is too short
//! instead of failing.

use crate::domain::{closes, MacdReading, PriceBar, SupportResistance, VolumeProfile};

pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;

/// Volume samples needed before a profile is classified
pub const MIN_VOLUME_SAMPLES: usize = 10;
const SHORT_VOLUME_WINDOW: usize = 5;
const LONG_VOLUME_WINDOW: usize = 20;
const ACCUMULATION_RATIO: f64 = 1.2;
const DISTRIBUTION_RATIO: f64 = 0.8;
const VOLUME_SPIKE_MULTIPLE: f64 = 2.0;

/// Neutral RSI returned for short windows
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative Strength Index over the trailing `period` close-to-close changes.
///
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss). A window without losses
/// reads 100 when it gained and 50 when it was flat. Fewer than
/// `period + 1` bars yields [`NEUTRAL_RSI`].
pub fn rsi(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let n = bars.len();
    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = bars[n - i].close - bars[n - i - 1].close;
        if change > 0.0 {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { NEUTRAL_RSI };
    }

    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Exponential moving average seeded with the first value of `values`.
///
/// Multiplier = 2 / (period + 1). Returns `None` for an empty slice.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    let (first, rest) = values.split_first()?;
    let multiplier = 2.0 / (period as f64 + 1.0);
    let ema = rest
        .iter()
        .fold(*first, |ema, price| price * multiplier + ema * (1.0 - multiplier));
    Some(ema)
}

/// MACD-like direction from EMA(12) over the last 12 closes and EMA(26)
/// over the last 26 closes.
pub fn macd_signal(bars: &[PriceBar]) -> MacdReading {
    if bars.len() < MACD_SLOW_PERIOD {
        return MacdReading::NEUTRAL;
    }

    let closes = closes(&bars[bars.len() - MACD_SLOW_PERIOD..]);

    let fast = ema(&closes[closes.len() - MACD_FAST_PERIOD..], MACD_FAST_PERIOD);
    let slow = ema(&closes, MACD_SLOW_PERIOD);

    match (fast, slow) {
        (Some(fast), Some(slow)) => {
            let line = fast - slow;
            MacdReading {
                direction: if line > 0.0 { 1 } else { -1 },
                histogram: line.abs(),
            }
        }
        _ => MacdReading::NEUTRAL,
    }
}

/// Ratio of the mean of the last 5 volumes to the mean of the last 20
/// (or of every sample when fewer are available).
pub fn volume_ratio(volumes: &[f64]) -> Option<f64> {
    if volumes.len() < MIN_VOLUME_SAMPLES {
        return None;
    }

    let recent = mean(&volumes[volumes.len() - SHORT_VOLUME_WINDOW..]);
    let longer = mean(&volumes[volumes.len().saturating_sub(LONG_VOLUME_WINDOW)..]);

    if longer <= 0.0 {
        return None;
    }
    Some(recent / longer)
}

/// Strict bands: exactly 1.2 or 0.8 stays neutral
pub fn classify_volume_ratio(ratio: f64) -> VolumeProfile {
    if ratio > ACCUMULATION_RATIO {
        VolumeProfile::Accumulation
    } else if ratio < DISTRIBUTION_RATIO {
        VolumeProfile::Distribution
    } else {
        VolumeProfile::Neutral
    }
}

pub fn volume_profile(volumes: &[f64]) -> VolumeProfile {
    volume_ratio(volumes)
        .map(classify_volume_ratio)
        .unwrap_or(VolumeProfile::Neutral)
}

/// Lowest low and highest high over the trailing `window` bars
pub fn support_resistance(bars: &[PriceBar], window: usize) -> Option<SupportResistance> {
    if bars.is_empty() || window == 0 {
        return None;
    }

    let recent = &bars[bars.len().saturating_sub(window)..];
    let support = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let resistance = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);

    Some(SupportResistance { support, resistance })
}

/// Mean true range over the trailing `period` bars (0 with fewer than 2 bars)
pub fn average_true_range(bars: &[PriceBar], period: usize) -> f64 {
    if bars.len() < 2 || period == 0 {
        return 0.0;
    }

    let start = bars.len().saturating_sub(period).max(1);
    let ranges: Vec<f64> = (start..bars.len())
        .map(|i| bars[i].true_range(bars[i - 1].close))
        .collect();

    mean(&ranges)
}

/// Chart patterns visible at the latest bar.
///
/// `window` is the number of bars preceding the latest one that the
/// breakout/breakdown checks compare against.
pub fn detect_patterns(bars: &[PriceBar], volumes: &[f64], window: usize) -> Vec<String> {
    let mut patterns = Vec::new();

    if let Some((last, history)) = bars.split_last() {
        let prior = &history[history.len().saturating_sub(window)..];
        if let Some(levels) = support_resistance(prior, window) {
            if last.close > levels.resistance {
                patterns.push("Resistance Breakout".to_string());
            } else if last.close < levels.support {
                patterns.push("Support Breakdown".to_string());
            }
        }
    }

    if volumes.len() >= LONG_VOLUME_WINDOW {
        let baseline = mean(&volumes[volumes.len() - LONG_VOLUME_WINDOW..]);
        if let Some(latest) = volumes.last() {
            if baseline > 0.0 && *latest > baseline * VOLUME_SPIKE_MULTIPLE {
                patterns.push("Volume Spike".to_string());
            }
        }
    }

    patterns
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
