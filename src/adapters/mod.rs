//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - JSON files: bar series on disk
//! - Static sentiment: configuration-backed sentiment inputs
//! - CLI: Command-line interface definitions

pub mod json_feed;
pub mod static_sentiment;
pub mod cli;

pub use json_feed::JsonFileMarketData;
pub use static_sentiment::StaticSentiment;
pub use cli::CliApp;
