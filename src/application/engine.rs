//! Analysis Engine
//!
//! Entry point for one analysis pass: per-timeframe signals and their
//! consensus, the global market regime, and per-symbol sentiment.
//! Signals and sentiment are written to the engine's [`SignalCache`].

use std::collections::HashMap;

use crate::application::cache::SignalCache;
use crate::domain::{self, MarketRegime, PriceBar, SentimentAnalysis, Signal, Timeframe};
use crate::ports::SentimentPort;
use crate::strategy::{
    ConsensusBuilder, EngineParams, ParamsError, RegimeClassifier, SentimentAggregator,
    SignalGenerator,
};

/// Bars and volumes observed at one timeframe
#[derive(Debug, Clone)]
pub struct TimeframeWindow {
    pub timeframe: Timeframe,
    pub bars: Vec<PriceBar>,
    pub volumes: Vec<f64>,
}

impl TimeframeWindow {
    /// Window whose volume series is taken from the bars
    pub fn from_bars(timeframe: Timeframe, bars: Vec<PriceBar>) -> Self {
        let volumes = domain::volumes(&bars);
        Self { timeframe, bars, volumes }
    }
}

/// Signal, regime and sentiment engine
#[derive(Debug)]
pub struct AnalysisEngine {
    params: EngineParams,
    generator: SignalGenerator,
    consensus: ConsensusBuilder,
    regime: RegimeClassifier,
    sentiment: SentimentAggregator,
    cache: SignalCache,
}

impl AnalysisEngine {
    /// Create engine with validated parameters
    pub fn new(params: EngineParams) -> Result<Self, ParamsError> {
        Self::with_cache(params, SignalCache::new())
    }

    pub fn with_cache(params: EngineParams, cache: SignalCache) -> Result<Self, ParamsError> {
        params.validate()?;

        Ok(Self {
            generator: SignalGenerator::new(params.signals.clone())?,
            consensus: ConsensusBuilder::new(params.consensus.clone()),
            regime: RegimeClassifier::new(params.regime.clone()),
            sentiment: SentimentAggregator::new(params.sentiment.clone()),
            params,
            cache,
        })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn cache(&self) -> &SignalCache {
        &self.cache
    }

    /// Signals for `symbol` without touching the cache.
    ///
    /// Windows too short for analysis are skipped. The consensus signal,
    /// when one exists, comes first.
    pub fn compute_signals(&self, symbol: &str, windows: &[TimeframeWindow]) -> Vec<Signal> {
        let per_timeframe: Vec<Signal> = windows
            .iter()
            .filter_map(|w| self.generator.analyze(symbol, &w.bars, &w.volumes, w.timeframe))
            .collect();

        let mut signals = Vec::with_capacity(per_timeframe.len() + 1);
        if let Some(consensus) = self.consensus.build(symbol, &per_timeframe) {
            tracing::info!(
                "{} consensus {} ({}%) across {} timeframes",
                symbol,
                consensus.kind,
                consensus.confidence,
                per_timeframe.len()
            );
            signals.push(consensus);
        }
        signals.extend(per_timeframe);
        signals
    }

    /// Signals for `symbol`, stored in the cache
    pub fn generate_signals(&self, symbol: &str, windows: &[TimeframeWindow]) -> Vec<Signal> {
        let signals = self.compute_signals(symbol, windows);
        tracing::debug!("{} produced {} signals from {} windows", symbol, signals.len(), windows.len());
        self.cache.set_signals(symbol, signals.clone());
        signals
    }

    /// Regime of the configured reference symbol's series in `market`
    pub fn detect_market_regime(&self, market: &HashMap<String, Vec<PriceBar>>) -> MarketRegime {
        if !market.contains_key(&self.params.reference_symbol) {
            tracing::warn!(
                "Reference symbol {} missing from market data, using neutral regime",
                self.params.reference_symbol
            );
        }
        self.regime.detect_market(market, &self.params.reference_symbol)
    }

    /// Classify a single reference series
    pub fn detect_regime(&self, bars: &[PriceBar]) -> MarketRegime {
        self.regime.detect(bars)
    }

    /// Sentiment for `symbol` without touching the cache
    pub async fn compute_sentiment(&self, symbol: &str, port: &dyn SentimentPort) -> SentimentAnalysis {
        self.sentiment.analyze(symbol, port).await
    }

    /// Sentiment for `symbol`, stored in the cache
    pub async fn analyze_sentiment(&self, symbol: &str, port: &dyn SentimentPort) -> SentimentAnalysis {
        let analysis = self.compute_sentiment(symbol, port).await;
        self.cache.set_sentiment(symbol, analysis.clone());
        analysis
    }
}
