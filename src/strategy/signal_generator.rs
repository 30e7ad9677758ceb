//! Per-Timeframe Signal Generator
//!
//! Combines indicator readings for one timeframe into a directional call:
//!
//! 1. Confidence starts at 50, kind at HOLD
//! 2. RSI oversold/overbought: +15, HOLD -> BUY/SELL
//! 3. MACD direction: +10, escalates BUY -> STRONG_BUY (or SELL -> STRONG_SELL)
//!    and never flips an opposite call made earlier in the same pass
//! 4. Accumulation/distribution volume: +12 regardless of direction
//! 5. Target and stop sit in ATR-derived bands around the close
//! 6. Confidence is capped at 95
//!
//! Windows shorter than `min_bars` produce no signal.

use crate::domain::{
    IndicatorSnapshot, PriceBar, Signal, SignalKind, Timeframe, VolumeProfile, MAX_CONFIDENCE,
};
use crate::strategy::indicators;
use crate::strategy::params::{ParamsError, SignalParams};

const BASE_CONFIDENCE: u32 = 50;
const RSI_WEIGHT: u32 = 15;
const MACD_WEIGHT: u32 = 10;
const VOLUME_WEIGHT: u32 = 12;

/// Target and stop-loss prices for a call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTargets {
    pub target: f64,
    pub stop_loss: f64,
}

/// Generates one signal per timeframe window
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    params: SignalParams,
}

impl SignalGenerator {
    /// Create a generator, rejecting parameters it cannot run with
    pub fn new(params: SignalParams) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Analyse one timeframe window.
    ///
    /// `volumes` is the volume series parallel to `bars`. Returns `None`
    /// when fewer than `min_bars` bars are available.
    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        volumes: &[f64],
        timeframe: Timeframe,
    ) -> Option<Signal> {
        if bars.len() < self.params.min_bars {
            return None;
        }

        let current_price = bars.last()?.close;
        let rsi = indicators::rsi(bars, self.params.rsi_period);
        let macd = indicators::macd_signal(bars);
        let volume_profile = indicators::volume_profile(volumes);
        let support_resistance = indicators::support_resistance(bars, self.params.sr_window)?;
        let patterns = indicators::detect_patterns(
            bars,
            volumes,
            self.params.sr_window.saturating_sub(1),
        );

        let mut kind = SignalKind::Hold;
        let mut confidence = BASE_CONFIDENCE;
        let mut reasoning = Vec::new();

        if rsi < self.params.rsi_oversold {
            reasoning.push(format!("RSI oversold at {:.1}", rsi));
            confidence += RSI_WEIGHT;
            if kind == SignalKind::Hold {
                kind = SignalKind::Buy;
            }
        } else if rsi > self.params.rsi_overbought {
            reasoning.push(format!("RSI overbought at {:.1}", rsi));
            confidence += RSI_WEIGHT;
            if kind == SignalKind::Hold {
                kind = SignalKind::Sell;
            }
        }

        if macd.direction > 0 && macd.histogram > 0.0 {
            reasoning.push("MACD bullish convergence".to_string());
            confidence += MACD_WEIGHT;
            kind = match kind {
                SignalKind::Buy => SignalKind::StrongBuy,
                SignalKind::Hold => SignalKind::Buy,
                other => other,
            };
        } else if macd.direction < 0 && macd.histogram > 0.0 {
            reasoning.push("MACD bearish divergence".to_string());
            confidence += MACD_WEIGHT;
            kind = match kind {
                SignalKind::Sell => SignalKind::StrongSell,
                SignalKind::Hold => SignalKind::Sell,
                other => other,
            };
        }

        match volume_profile {
            VolumeProfile::Accumulation => {
                reasoning.push("Volume shows accumulation pattern".to_string());
                confidence += VOLUME_WEIGHT;
            }
            VolumeProfile::Distribution => {
                reasoning.push("Volume shows distribution pattern".to_string());
                confidence += VOLUME_WEIGHT;
            }
            VolumeProfile::Neutral => {}
        }

        let atr = indicators::average_true_range(bars, self.params.atr_period);
        let targets = self.price_targets(kind, current_price, atr);
        let confidence = confidence.min(MAX_CONFIDENCE as u32) as u8;

        tracing::debug!(
            "{} {} | RSI {:.1} | MACD {:+} ({:.4}) | Volume {} | {} @ {}%",
            symbol,
            timeframe,
            rsi,
            macd.direction,
            macd.histogram,
            volume_profile,
            kind,
            confidence
        );

        Some(Signal {
            symbol: symbol.to_string(),
            kind,
            confidence,
            timeframe,
            entry_price: current_price,
            target_price: targets.target,
            stop_loss: targets.stop_loss,
            risk_reward_ratio: Signal::risk_reward(current_price, targets.target, targets.stop_loss),
            reasoning,
            patterns,
            indicators: IndicatorSnapshot {
                rsi,
                macd,
                volume_profile,
                support_resistance,
            },
        })
    }

    /// Target/stop bands: ATR multiples as a fraction of price, clamped to
    /// the configured ranges. BUY-family calls aim up with the stop below;
    /// everything else mirrors that.
    pub fn price_targets(&self, kind: SignalKind, price: f64, atr: f64) -> PriceTargets {
        let atr_pct = if price > 0.0 { atr / price } else { 0.0 };
        let target_pct = (atr_pct * self.params.target_atr_multiple)
            .clamp(self.params.target_min_pct, self.params.target_max_pct);
        let stop_pct = (atr_pct * self.params.stop_atr_multiple)
            .clamp(self.params.stop_min_pct, self.params.stop_max_pct);

        if kind.is_buy_family() {
            PriceTargets {
                target: price * (1.0 + target_pct),
                stop_loss: price * (1.0 - stop_pct),
            }
        } else {
            PriceTargets {
                target: price * (1.0 - target_pct),
                stop_loss: price * (1.0 + stop_pct),
            }
        }
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self {
            params: SignalParams::default(),
        }
    }
}
