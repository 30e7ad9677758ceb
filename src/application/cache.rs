//! Signal Cache
//!
//! Latest signals and sentiment per symbol, last-write-wins.
//! Entries are replaced whole behind an `Arc`, so a reader holding an
//! entry never observes a half-written update. Eviction runs after the
//! write, so the size returns to `max_entries` once concurrent writers
//! finish.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::{SentimentAnalysis, Signal};

/// Cached results for one symbol
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Consensus first (if any), then per-timeframe signals
    pub signals: Vec<Signal>,
    pub sentiment: Option<SentimentAnalysis>,
    /// When the signal list was last written
    pub signals_updated_at: Option<Instant>,
    pub updated_at: Instant,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            signals: Vec::new(),
            sentiment: None,
            signals_updated_at: None,
            updated_at: Instant::now(),
        }
    }

    /// Age of the signal list, `None` if signals were never written
    pub fn signals_age(&self) -> Option<Duration> {
        self.signals_updated_at.map(|t| t.elapsed())
    }
}

/// Bounded per-symbol result cache
#[derive(Debug)]
pub struct SignalCache {
    entries: DashMap<String, Arc<CacheEntry>>,
    max_entries: usize,
}

impl SignalCache {
    /// Default max cached symbols
    pub const DEFAULT_MAX_ENTRIES: usize = 1000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Snapshot of the entry for `symbol`
    pub fn get(&self, symbol: &str) -> Option<Arc<CacheEntry>> {
        self.entries.get(symbol).map(|e| Arc::clone(e.value()))
    }

    /// Write one cycle's results for `symbol` in a single swap.
    ///
    /// `None` keeps the previous sentiment.
    pub fn set(&self, symbol: &str, signals: Vec<Signal>, sentiment: Option<SentimentAnalysis>) {
        self.update(symbol, |entry| {
            entry.signals = signals;
            entry.signals_updated_at = Some(Instant::now());
            if sentiment.is_some() {
                entry.sentiment = sentiment;
            }
        });
    }

    /// Replace the signal list for `symbol`, keeping its sentiment
    pub fn set_signals(&self, symbol: &str, signals: Vec<Signal>) {
        self.update(symbol, |entry| {
            entry.signals = signals;
            entry.signals_updated_at = Some(Instant::now());
        });
    }

    /// Replace the sentiment for `symbol`, keeping its signals
    pub fn set_sentiment(&self, symbol: &str, sentiment: SentimentAnalysis) {
        self.update(symbol, |entry| entry.sentiment = Some(sentiment));
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn update(&self, symbol: &str, apply: impl FnOnce(&mut CacheEntry)) {
        {
            let mut slot = self
                .entries
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(CacheEntry::empty()));

            let mut next = CacheEntry::clone(slot.value());
            apply(&mut next);
            next.updated_at = Instant::now();
            *slot.value_mut() = Arc::new(next);
        }

        // Scan only after the shard lock for `symbol` is released
        while self.entries.len() > self.max_entries {
            if !self.remove_oldest(symbol) {
                break;
            }
        }
    }

    /// Remove the least recently written entry other than `keep`
    fn remove_oldest(&self, keep: &str) -> bool {
        let oldest = self
            .entries
            .iter()
            .filter(|entry| entry.key() != keep)
            .min_by_key(|entry| entry.value().updated_at)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(key) => {
                tracing::debug!("Signal cache full ({}), evicting {}", self.max_entries, key);
                // Another writer may have removed it first
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }
}

impl Default for SignalCache {
    fn default() -> Self {
        Self::new()
    }
}
