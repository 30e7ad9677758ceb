//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::application::orchestrator::first_duplicate;
use crate::application::{OrchestratorSettings, SignalCache};
use crate::domain::{InstitutionalFlow, Timeframe, WhaleActivity};
use crate::strategy::params::{
    ConsensusParams, EngineParams, RegimeParams, SentimentParams, SignalParams,
};

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub signals: SignalParams,
    #[serde(default)]
    pub consensus: ConsensusParams,
    #[serde(default)]
    pub regime: RegimeParams,
    #[serde(default)]
    pub sentiment: SentimentSection,
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Engine configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Timeframes analysed per symbol ("1m", "5m", "15m", "1h", "4h", "1d")
    pub timeframes: Vec<Timeframe>,
    /// Symbol whose series drives regime detection
    pub reference_symbol: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            timeframes: params.timeframes,
            reference_symbol: params.reference_symbol,
        }
    }
}

/// Sentiment configuration section.
///
/// Besides the source list, carries the static inputs served by
/// [`StaticSentiment`](crate::adapters::StaticSentiment).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentSection {
    pub sources: Vec<String>,
    /// Per-source scores (-1..1); sources missing here are unavailable
    pub scores: BTreeMap<String, f64>,
    /// 0-100
    pub fear_greed_index: f64,
    pub social_mentions: u64,
    pub whale_activity: WhaleActivity,
    pub institutional_flow: InstitutionalFlow,
    /// -1..1
    pub news_sentiment: f64,
}

impl Default for SentimentSection {
    fn default() -> Self {
        Self {
            sources: SentimentParams::default().sources,
            scores: BTreeMap::new(),
            fear_greed_index: 50.0,
            social_mentions: 0,
            whale_activity: WhaleActivity::Neutral,
            institutional_flow: InstitutionalFlow::Neutral,
            news_sentiment: 0.0,
        }
    }
}

/// Scheduling configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    /// Symbols analysed every cycle
    pub symbols: Vec<String>,
    /// Seconds between cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Per-symbol budget; slower analyses are discarded
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Skip symbols refreshed within this many seconds (0 disables)
    #[serde(default = "default_min_refresh_secs")]
    pub min_refresh_secs: u64,
    /// Maximum symbols held in the result cache
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
    /// Timeframe of the reference series for regime detection
    #[serde(default = "default_regime_timeframe")]
    pub regime_timeframe: Timeframe,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_refresh_secs() -> u64 {
    5
}

fn default_cache_max_entries() -> usize {
    SignalCache::DEFAULT_MAX_ENTRIES
}

fn default_regime_timeframe() -> Timeframe {
    Timeframe::D1
}

/// Market data configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory holding `{SYMBOL}_{timeframe}.json` bar files
    pub data_dir: String,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl DataSection {
    /// Get data directory with environment variable override
    /// Checks CODOX_DATA_DIR env var first, expands `~` and `$VARS`
    pub fn get_data_dir(&self) -> PathBuf {
        let raw = std::env::var("CODOX_DATA_DIR").unwrap_or_else(|_| self.data_dir.clone());
        match shellexpand::full(&raw) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                tracing::warn!("Could not expand data_dir {}: {}", raw, e);
                PathBuf::from(raw)
            }
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        EngineParams::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        // Validate orchestrator section
        if self.orchestrator.symbols.is_empty() {
            return Err(ConfigError::ValidationError(
                "orchestrator.symbols cannot be empty".to_string(),
            ));
        }

        if self.orchestrator.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "orchestrator.symbols cannot contain empty names".to_string(),
            ));
        }

        if let Some(symbol) = first_duplicate(&self.orchestrator.symbols) {
            return Err(ConfigError::ValidationError(format!(
                "orchestrator.symbols lists {} more than once",
                symbol
            )));
        }

        if self.orchestrator.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if self.orchestrator.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.orchestrator.cache_max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache_max_entries must be > 0".to_string(),
            ));
        }

        if self.orchestrator.regime_timeframe == Timeframe::Consensus {
            return Err(ConfigError::ValidationError(
                "regime_timeframe cannot be 'consensus'".to_string(),
            ));
        }

        // Validate sentiment inputs
        if !(0.0..=100.0).contains(&self.sentiment.fear_greed_index) {
            return Err(ConfigError::ValidationError(format!(
                "fear_greed_index must be 0-100, got {}",
                self.sentiment.fear_greed_index
            )));
        }

        if !(-1.0..=1.0).contains(&self.sentiment.news_sentiment) {
            return Err(ConfigError::ValidationError(format!(
                "news_sentiment must be -1..1, got {}",
                self.sentiment.news_sentiment
            )));
        }

        if let Some((source, score)) = self
            .sentiment
            .scores
            .iter()
            .find(|(_, v)| !(-1.0..=1.0).contains(*v))
        {
            return Err(ConfigError::ValidationError(format!(
                "sentiment score for {} must be -1..1, got {}",
                source, score
            )));
        }

        // Validate data and logging
        if self.data.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

// Conversion from Config to EngineParams
impl From<&Config> for EngineParams {
    fn from(config: &Config) -> Self {
        EngineParams {
            timeframes: config.engine.timeframes.clone(),
            reference_symbol: config.engine.reference_symbol.clone(),
            signals: config.signals.clone(),
            consensus: config.consensus.clone(),
            regime: config.regime.clone(),
            sentiment: SentimentParams {
                sources: config.sentiment.sources.clone(),
            },
        }
    }
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        OrchestratorSettings {
            symbols: config.orchestrator.symbols.clone(),
            poll_interval: Duration::from_secs(config.orchestrator.poll_interval_secs),
            symbol_timeout: Duration::from_secs(config.orchestrator.timeout_secs),
            min_refresh: Duration::from_secs(config.orchestrator.min_refresh_secs),
            regime_timeframe: config.orchestrator.regime_timeframe,
        }
    }
}
