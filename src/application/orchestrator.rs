//! Analysis Orchestrator
//!
//! Scheduled recomputation loop. Each cycle fetches every configured
//! symbol's timeframe windows, regenerates its signals and sentiment as an
//! independent task under a timeout, then refreshes the global regime.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinSet;

use crate::application::engine::{AnalysisEngine, TimeframeWindow};
use crate::domain::{MarketRegime, SentimentAnalysis, Signal, Timeframe};
use crate::ports::{MarketDataError, MarketDataPort, SentimentPort};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Regime refresh failed: {0}")]
    RegimeError(#[from] MarketDataError),
}

/// Loop timing and symbol selection
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub symbols: Vec<String>,
    pub poll_interval: Duration,
    /// Budget for one symbol's fetch + analysis
    pub symbol_timeout: Duration,
    /// Symbols whose signals are younger than this are skipped
    pub min_refresh: Duration,
    /// Timeframe of the reference series used for the regime
    pub regime_timeframe: Timeframe,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            poll_interval: Duration::from_secs(60),
            symbol_timeout: Duration::from_secs(10),
            min_refresh: Duration::from_secs(5),
            regime_timeframe: Timeframe::D1,
        }
    }
}

/// Outcome counts for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub analyzed: usize,
    /// Refreshed too recently
    pub skipped: usize,
    /// Exceeded the per-symbol timeout; previous cache entry kept
    pub timed_out: usize,
    pub failed: usize,
}

/// Status snapshot of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub is_running: bool,
    pub symbols: Vec<String>,
    pub cycles: u64,
    pub last_cycle: Option<CycleReport>,
    pub regime: Option<MarketRegime>,
}

/// Drives the analysis engine on a fixed interval
pub struct AnalysisOrchestrator {
    engine: Arc<AnalysisEngine>,
    market_data: Arc<dyn MarketDataPort>,
    sentiment: Option<Arc<dyn SentimentPort>>,
    settings: OrchestratorSettings,
    is_running: Arc<RwLock<bool>>,
    cycles: Arc<RwLock<u64>>,
    last_cycle: Arc<RwLock<Option<CycleReport>>>,
    regime: Arc<RwLock<Option<MarketRegime>>>,
}

struct SymbolResult {
    signals: Vec<Signal>,
    sentiment: Option<SentimentAnalysis>,
}

enum SymbolOutcome {
    Done,
    TimedOut,
}

impl AnalysisOrchestrator {
    /// Create new orchestrator
    pub fn new(
        engine: Arc<AnalysisEngine>,
        market_data: Arc<dyn MarketDataPort>,
        settings: OrchestratorSettings,
    ) -> Result<Self, OrchestratorError> {
        if settings.symbols.is_empty() {
            return Err(OrchestratorError::ConfigError("no symbols configured".to_string()));
        }
        if settings.symbol_timeout.is_zero() {
            return Err(OrchestratorError::ConfigError("symbol timeout must be > 0".to_string()));
        }
        if let Some(symbol) = first_duplicate(&settings.symbols) {
            return Err(OrchestratorError::ConfigError(format!(
                "symbol {} listed more than once",
                symbol
            )));
        }

        Ok(Self {
            engine,
            market_data,
            sentiment: None,
            settings,
            is_running: Arc::new(RwLock::new(false)),
            cycles: Arc::new(RwLock::new(0)),
            last_cycle: Arc::new(RwLock::new(None)),
            regime: Arc::new(RwLock::new(None)),
        })
    }

    /// Also refresh sentiment each cycle
    pub fn with_sentiment(mut self, sentiment: Arc<dyn SentimentPort>) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll_interval = interval;
        self
    }

    pub fn engine(&self) -> &Arc<AnalysisEngine> {
        &self.engine
    }

    /// Run cycles until [`stop`](Self::stop) is called
    pub async fn run(&self) -> Result<(), OrchestratorError> {
        *self.is_running.write().await = true;

        tracing::info!(
            "Starting analysis orchestrator - {} symbols, poll interval: {:?}, timeout: {:?}",
            self.settings.symbols.len(),
            self.settings.poll_interval,
            self.settings.symbol_timeout
        );

        while *self.is_running.read().await {
            if let Err(e) = self.tick().await {
                tracing::error!("Tick error: {}", e);
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        tracing::info!("Analysis orchestrator stopped");
        Ok(())
    }

    /// Execute one analysis cycle
    pub async fn tick(&self) -> Result<CycleReport, OrchestratorError> {
        let mut report = CycleReport::default();
        let mut tasks = JoinSet::new();

        for symbol in &self.settings.symbols {
            if self.refreshed_recently(symbol) {
                tracing::debug!("{} refreshed within {:?}, skipping", symbol, self.settings.min_refresh);
                report.skipped += 1;
                continue;
            }

            let engine = Arc::clone(&self.engine);
            let market_data = Arc::clone(&self.market_data);
            let sentiment = self.sentiment.clone();
            let timeout = self.settings.symbol_timeout;
            let symbol = symbol.clone();

            tasks.spawn(async move {
                let work = analyze_symbol(&engine, market_data.as_ref(), sentiment.as_deref(), &symbol);
                match tokio::time::timeout(timeout, work).await {
                    Ok(result) => {
                        engine.cache().set(&symbol, result.signals, result.sentiment);
                        SymbolOutcome::Done
                    }
                    Err(_) => {
                        tracing::warn!("{} analysis exceeded {:?}, keeping previous results", symbol, timeout);
                        SymbolOutcome::TimedOut
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(SymbolOutcome::Done) => report.analyzed += 1,
                Ok(SymbolOutcome::TimedOut) => report.timed_out += 1,
                Err(e) => {
                    tracing::error!("Symbol task failed: {}", e);
                    report.failed += 1;
                }
            }
        }

        *self.cycles.write().await += 1;
        *self.last_cycle.write().await = Some(report.clone());

        tracing::info!(
            "Cycle complete: {} analyzed, {} skipped, {} timed out, {} failed",
            report.analyzed,
            report.skipped,
            report.timed_out,
            report.failed
        );

        self.refresh_regime().await?;
        Ok(report)
    }

    /// Reclassify the market from the reference symbol's series
    async fn refresh_regime(&self) -> Result<MarketRegime, OrchestratorError> {
        let reference = self.engine.params().reference_symbol.clone();
        let bars = self
            .market_data
            .fetch_bars(&reference, self.settings.regime_timeframe)
            .await?;

        let mut market = HashMap::new();
        market.insert(reference, bars);
        let regime = self.engine.detect_market_regime(&market);

        tracing::info!(
            "Market regime: {} ({}%) - {}",
            regime.regime,
            regime.confidence,
            regime.dominant_narrative
        );
        *self.regime.write().await = Some(regime.clone());
        Ok(regime)
    }

    fn refreshed_recently(&self, symbol: &str) -> bool {
        if self.settings.min_refresh.is_zero() {
            return false;
        }
        self.engine
            .cache()
            .get(symbol)
            .and_then(|entry| entry.signals_age())
            .map(|age| age < self.settings.min_refresh)
            .unwrap_or(false)
    }

    /// Stop scheduling further cycles; an in-flight cycle completes
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        tracing::info!("Stop signal sent to orchestrator");
    }

    /// Get current status snapshot
    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            is_running: *self.is_running.read().await,
            symbols: self.settings.symbols.clone(),
            cycles: *self.cycles.read().await,
            last_cycle: self.last_cycle.read().await.clone(),
            regime: self.regime.read().await.clone(),
        }
    }

    /// Latest regime, if a cycle has completed one
    pub async fn regime(&self) -> Option<MarketRegime> {
        self.regime.read().await.clone()
    }
}

impl Clone for AnalysisOrchestrator {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            market_data: Arc::clone(&self.market_data),
            sentiment: self.sentiment.clone(),
            settings: self.settings.clone(),
            is_running: Arc::clone(&self.is_running),
            cycles: Arc::clone(&self.cycles),
            last_cycle: Arc::clone(&self.last_cycle),
            regime: Arc::clone(&self.regime),
        }
    }
}

/// First symbol that appears twice in `symbols`.
///
/// Each symbol gets one task per cycle, so a repeat would race itself on
/// the same cache key.
pub(crate) fn first_duplicate(symbols: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .find(|s| !seen.insert(s.as_str()))
        .map(String::as_str)
}

/// Fetch every timeframe window for `symbol` and compute its results.
///
/// A timeframe whose fetch fails is left out of the analysis.
async fn analyze_symbol(
    engine: &AnalysisEngine,
    market_data: &dyn MarketDataPort,
    sentiment: Option<&dyn SentimentPort>,
    symbol: &str,
) -> SymbolResult {
    let mut windows = Vec::with_capacity(engine.params().timeframes.len());
    for &timeframe in &engine.params().timeframes {
        match market_data.fetch_bars(symbol, timeframe).await {
            Ok(bars) => windows.push(TimeframeWindow::from_bars(timeframe, bars)),
            Err(e) => tracing::warn!("{} {} fetch failed: {}", symbol, timeframe, e),
        }
    }

    let signals = engine.compute_signals(symbol, &windows);
    let sentiment = match sentiment {
        Some(port) => Some(engine.compute_sentiment(symbol, port).await),
        None => None,
    };

    SymbolResult { signals, sentiment }
}
