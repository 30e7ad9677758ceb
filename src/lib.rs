//! Codox Signals - Signal Generation & Market Regime Engine
//!
//! Ingests OHLCV series, computes technical indicators, emits per-timeframe
//! trading signals with confidence and risk parameters, reduces timeframes
//! into a consensus call, classifies the global market regime and aggregates
//! multi-source sentiment.
//!
//! # Modules
//!
//! - `domain`: Core records (PriceBar, Signal, MarketRegime, SentimentAnalysis)
//! - `ports`: Trait abstractions (MarketDataPort, SentimentPort)
//! - `strategy`: Indicators, signal generation, consensus, regime, sentiment
//! - `adapters`: External implementations (JSON files, static sentiment, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Engine, result cache and orchestrator

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
