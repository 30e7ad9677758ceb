//! Multi-Timeframe Consensus
//!
//! Reduces the per-timeframe signals of one symbol into a single call.
//! The most frequent signal kind wins only when it holds at least
//! `min_agreement` of the votes; otherwise no consensus exists.

use crate::domain::{Signal, SignalKind, Timeframe, MAX_CONFIDENCE};
use crate::strategy::params::ConsensusParams;

/// Builds consensus signals from per-timeframe signals
#[derive(Debug, Clone)]
pub struct ConsensusBuilder {
    params: ConsensusParams,
}

impl ConsensusBuilder {
    pub fn new(params: ConsensusParams) -> Self {
        Self { params }
    }

    /// Reduce `signals` into one consensus signal for `symbol`.
    ///
    /// Returns `None` with fewer than `min_signals` inputs or when the
    /// dominant kind's share falls below `min_agreement`.
    pub fn build(&self, symbol: &str, signals: &[Signal]) -> Option<Signal> {
        if signals.len() < self.params.min_signals {
            return None;
        }
        let first = signals.first()?;

        let (dominant, votes) = dominant_kind(signals)?;
        let total = signals.len() as f64;
        let agreement = votes as f64 / total;

        if agreement < self.params.min_agreement {
            tracing::debug!(
                "{} no consensus: {} holds {:.0}% of {} signals",
                symbol,
                dominant,
                agreement * 100.0,
                signals.len()
            );
            return None;
        }

        let avg_confidence = signals.iter().map(|s| s.confidence as f64).sum::<f64>() / total;
        let confidence = (avg_confidence * agreement).round().min(MAX_CONFIDENCE as f64) as u8;

        let entry_price = first.entry_price;
        let target_price = signals.iter().map(|s| s.target_price).sum::<f64>() / total;
        let stop_loss = signals.iter().map(|s| s.stop_loss).sum::<f64>() / total;

        let mut patterns: Vec<String> = Vec::new();
        for pattern in signals.iter().flat_map(|s| s.patterns.iter()) {
            if !patterns.contains(pattern) {
                patterns.push(pattern.clone());
            }
        }

        Some(Signal {
            symbol: symbol.to_string(),
            kind: dominant,
            confidence,
            timeframe: Timeframe::Consensus,
            entry_price,
            target_price,
            stop_loss,
            risk_reward_ratio: Signal::risk_reward(entry_price, target_price, stop_loss),
            reasoning: vec![format!(
                "Multi-timeframe consensus: {:.0}% agreement",
                agreement * 100.0
            )],
            patterns,
            indicators: first.indicators.clone(),
        })
    }
}

impl Default for ConsensusBuilder {
    fn default() -> Self {
        Self::new(ConsensusParams::default())
    }
}

/// Most frequent kind and its vote count; ties go to the kind seen first
fn dominant_kind(signals: &[Signal]) -> Option<(SignalKind, usize)> {
    let mut tally: Vec<(SignalKind, usize)> = Vec::new();
    for signal in signals {
        match tally.iter_mut().find(|(kind, _)| *kind == signal.kind) {
            Some((_, count)) => *count += 1,
            None => tally.push((signal.kind, 1)),
        }
    }

    let mut best: Option<(SignalKind, usize)> = None;
    for (kind, count) in tally {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((kind, count)),
        }
    }
    best
}
