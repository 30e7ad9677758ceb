//! Strategy Layer - Signal generation, consensus, regime and sentiment
//!
//! Pure computations over immutable bar windows:
//! - Stateless indicators (RSI, EMA/MACD, volume profile, support/resistance, ATR)
//! - Per-timeframe signal generation with confidence scoring and price bands
//! - Multi-timeframe consensus reduction
//! - Market regime classification from a reference series
//! - Multi-source sentiment aggregation
//!
//! Data flows one way: bars -> indicators -> per-timeframe signals -> consensus.
//! Regime and sentiment run independently.

pub mod params;
pub mod indicators;
pub mod signal_generator;
pub mod consensus;
pub mod regime;
pub mod sentiment;

pub use params::{
    ConsensusParams, EngineParams, ParamsError, RegimeParams, SentimentParams, SignalParams,
};
pub use signal_generator::{PriceTargets, SignalGenerator};
pub use consensus::ConsensusBuilder;
pub use regime::{classify, RegimeClassifier, RegimeInputs};
pub use sentiment::SentimentAggregator;
