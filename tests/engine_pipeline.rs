//! Engine Pipeline Integration Tests
//!
//! Verifies the signal engine components work together:
//! 1. JSON bar files -> JsonFileMarketData -> AnalysisEngine -> cache
//! 2. Signal outputs fed back as the next window stay consistent
//! 3. AnalysisOrchestrator timeouts keep the previous cache entry
//! 4. Concurrent cache readers only ever see complete entries
//!
//! All tests are deterministic (seeded randomness, no network calls).

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use codox_signals::adapters::{JsonFileMarketData, StaticSentiment};
use codox_signals::application::{
    AnalysisEngine, AnalysisOrchestrator, OrchestratorSettings, SignalCache, TimeframeWindow,
};
use codox_signals::domain::{PriceBar, Regime, Signal, SignalKind, Timeframe};
use codox_signals::ports::{MarketDataError, MarketDataPort};
use codox_signals::strategy::{indicators, EngineParams};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Geometric random walk with OHLC spread around each close
fn random_walk(rng: &mut StdRng, n: usize, start: f64, drift: f64) -> Vec<PriceBar> {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut close = start;
    (0..n)
        .map(|i| {
            let open = close;
            close *= 1.0 + drift + rng.gen_range(-0.02..0.02);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500.0..5_000.0);
            PriceBar::new(t0 + ChronoDuration::hours(i as i64), open, high, low, close, volume)
        })
        .collect()
}

fn trending_bars(n: usize, start: f64, step: f64) -> Vec<PriceBar> {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let c = start + step * i as f64;
            PriceBar::new(t0 + ChronoDuration::hours(i as i64), c, c + 0.5, c - 0.5, c, 1_000.0)
        })
        .collect()
}

fn write_series(dir: &TempDir, symbol: &str, timeframe: Timeframe, bars: &[PriceBar]) {
    let path = dir.path().join(format!("{}_{}.json", symbol, timeframe));
    std::fs::write(path, serde_json::to_string(bars).unwrap()).unwrap();
}

fn assert_consistent(signal: &Signal) {
    assert!(signal.validate().is_ok(), "invalid signal: {:?}", signal);
    assert!((0.0..=100.0).contains(&signal.indicators.rsi));
    if signal.kind.is_buy_family() {
        assert!(signal.target_price > signal.entry_price);
        assert!(signal.stop_loss < signal.entry_price);
    } else {
        assert!(signal.target_price < signal.entry_price);
        assert!(signal.stop_loss > signal.entry_price);
    }
}

/// Market data port whose responses can be slowed down mid-test
struct SlowFeed {
    delay_ms: AtomicU64,
    bars: Vec<PriceBar>,
}

impl SlowFeed {
    fn new(bars: Vec<PriceBar>) -> Self {
        Self { delay_ms: AtomicU64::new(0), bars }
    }

    fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketDataPort for SlowFeed {
    async fn fetch_bars(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(self.bars.clone())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_json_feed_to_cached_signals() {
    let dir = TempDir::new().unwrap();
    let timeframes = [Timeframe::M15, Timeframe::H1, Timeframe::H4];
    for tf in timeframes {
        write_series(&dir, "SOL", tf, &trending_bars(80, 200.0, -1.0));
    }
    // 1d file missing: that timeframe is skipped
    let feed = JsonFileMarketData::new(dir.path());
    let engine = AnalysisEngine::new(
        EngineParams::default().with_timeframes(vec![
            Timeframe::M15,
            Timeframe::H1,
            Timeframe::H4,
            Timeframe::D1,
        ]),
    )
    .unwrap();

    let mut windows = Vec::new();
    for &tf in &engine.params().timeframes {
        if let Ok(bars) = feed.fetch_bars("SOL", tf).await {
            windows.push(TimeframeWindow::from_bars(tf, bars));
        }
    }
    assert_eq!(windows.len(), 3);

    let signals = engine.generate_signals("SOL", &windows);
    assert_eq!(signals.len(), 4);
    assert!(signals[0].is_consensus());
    assert_eq!(signals[0].kind, SignalKind::Buy);
    for signal in &signals {
        assert_consistent(signal);
    }

    let source = StaticSentiment::new(BTreeMap::new());
    let sentiment = engine.analyze_sentiment("SOL", &source).await;
    assert_eq!(sentiment.overall_sentiment, 0.0);

    let entry = engine.cache().get("SOL").unwrap();
    assert_eq!(entry.signals, signals);
    assert_eq!(entry.sentiment.as_ref(), Some(&sentiment));
}

#[test]
fn test_random_walks_respect_ranges() {
    let mut rng = StdRng::seed_from_u64(7);
    let engine = AnalysisEngine::new(EngineParams::default()).unwrap();

    for round in 0..50 {
        let drift = rng.gen_range(-0.01..0.01);
        let windows: Vec<TimeframeWindow> = Timeframe::DEFAULT_SET
            .iter()
            .map(|&tf| TimeframeWindow::from_bars(tf, random_walk(&mut rng, 120, 50.0, drift)))
            .collect();

        let signals = engine.compute_signals(&format!("R{}", round), &windows);
        assert!(signals.len() >= 6);

        for signal in signals.iter().filter(|s| !s.is_consensus()) {
            assert!((50..=95).contains(&signal.confidence));
            assert_consistent(signal);
        }
        if let Some(consensus) = signals.first().filter(|s| s.is_consensus()) {
            assert!(consensus.confidence <= 95);
            assert!(consensus.validate().is_ok());
        }
    }
}

#[test]
fn test_outputs_fed_back_stay_consistent() {
    let mut rng = StdRng::seed_from_u64(42);
    let engine = AnalysisEngine::new(EngineParams::default()).unwrap();
    let mut bars = random_walk(&mut rng, 100, 20.0, 0.0);

    for _ in 0..25 {
        let window = TimeframeWindow::from_bars(Timeframe::H1, bars.clone());
        let signal = engine.compute_signals("LOOP", &[window]).remove(0);
        assert_consistent(&signal);

        // Synthetic next bar: opens at entry, trades to target and stop, closes at target
        let last = bars[bars.len() - 1];
        let next = PriceBar::new(
            last.timestamp + ChronoDuration::hours(1),
            signal.entry_price,
            signal.target_price.max(signal.stop_loss),
            signal.target_price.min(signal.stop_loss),
            signal.target_price,
            last.volume,
        );
        bars.remove(0);
        bars.push(next);

        let window = TimeframeWindow::from_bars(Timeframe::H1, bars.clone());
        let follow = engine.compute_signals("LOOP", &[window]).remove(0);
        assert_consistent(&follow);
        assert_eq!(follow.entry_price, signal.target_price);
        let sr = follow.indicators.support_resistance;
        assert!(sr.support <= next.low);
        assert!(sr.resistance >= next.high);
    }
}

#[test]
fn test_regime_from_market_map() {
    let engine = AnalysisEngine::new(EngineParams::default()).unwrap();
    let mut market = HashMap::new();
    market.insert("BTC".to_string(), trending_bars(40, 100.0, 3.0));
    market.insert("SOL".to_string(), trending_bars(40, 100.0, -2.0));

    let regime = engine.detect_market_regime(&market);
    assert_eq!(regime.regime, Regime::Bull);
    assert_eq!(regime.confidence, 85);
    assert!(regime.trend_strength <= 1.0);

    // A short reference series falls back to the neutral record
    market.insert("BTC".to_string(), trending_bars(10, 100.0, 3.0));
    let regime = engine.detect_market_regime(&market);
    assert_eq!(regime.regime, Regime::Crab);
    assert_eq!(regime.confidence, 0);
}

#[test]
fn test_indicators_on_random_walk() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let bars = random_walk(&mut rng, 60, 10.0, 0.0);
        let rsi = indicators::rsi(&bars, 14);
        assert!((0.0..=100.0).contains(&rsi));

        let sr = indicators::support_resistance(&bars, 50).unwrap();
        assert!(sr.support <= sr.resistance);
    }
}

// ============================================================================
// Orchestrator & Cache
// ============================================================================

#[tokio::test]
async fn test_timeout_keeps_previous_entry() {
    let feed = Arc::new(SlowFeed::new(trending_bars(60, 200.0, -1.0)));
    let engine = Arc::new(
        AnalysisEngine::new(
            EngineParams::default()
                .with_timeframes(vec![Timeframe::M1, Timeframe::M5, Timeframe::H1]),
        )
        .unwrap(),
    );
    let settings = OrchestratorSettings {
        symbols: vec!["SOL".to_string()],
        symbol_timeout: Duration::from_millis(100),
        min_refresh: Duration::ZERO,
        ..OrchestratorSettings::default()
    };
    let orch = AnalysisOrchestrator::new(Arc::clone(&engine), feed.clone(), settings).unwrap();

    let first = orch.tick().await.unwrap();
    assert_eq!(first.analyzed, 1);
    let before = engine.cache().get("SOL").unwrap();
    assert_eq!(before.signals.len(), 4);

    feed.set_delay(Duration::from_millis(400));
    // The regime refresh also waits on the slow feed; only the symbol result matters here
    let second = orch.tick().await.unwrap();
    assert_eq!(second.timed_out, 1);
    assert_eq!(second.analyzed, 0);

    let after = engine.cache().get("SOL").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_cache_readers_never_see_partial_entries() {
    let cache = Arc::new(SignalCache::with_capacity(16));
    let engine = AnalysisEngine::new(EngineParams::default()).unwrap();

    let windows_a = vec![
        TimeframeWindow::from_bars(Timeframe::M1, trending_bars(60, 200.0, -1.0)),
        TimeframeWindow::from_bars(Timeframe::M5, trending_bars(60, 200.0, -1.0)),
        TimeframeWindow::from_bars(Timeframe::H1, trending_bars(60, 200.0, -1.0)),
    ];
    let windows_b = vec![TimeframeWindow::from_bars(Timeframe::D1, trending_bars(60, 100.0, 1.0))];
    let list_a = engine.compute_signals("SOL", &windows_a);
    let list_b = engine.compute_signals("SOL", &windows_b);
    assert_eq!(list_a.len(), 4);
    assert_eq!(list_b.len(), 1);

    let writer = {
        let cache = Arc::clone(&cache);
        let (a, b) = (list_a.clone(), list_b.clone());
        tokio::spawn(async move {
            for i in 0..500 {
                let next = if i % 2 == 0 { a.clone() } else { b.clone() };
                cache.set_signals("SOL", next);
                tokio::task::yield_now().await;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let (a, b) = (list_a.clone(), list_b.clone());
            tokio::spawn(async move {
                for _ in 0..500 {
                    if let Some(entry) = cache.get("SOL") {
                        assert!(entry.signals == a || entry.signals == b);
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}
