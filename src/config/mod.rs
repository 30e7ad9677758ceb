//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, DataSection, EngineSection, LoggingSection, OrchestratorSection,
    SentimentSection, load_config,
};
