//! Application Layer - Engine, result cache and scheduling
//!
//! Wires the strategy layer to the ports:
//! - `engine`: one-shot signal, regime and sentiment analysis
//! - `cache`: latest results per symbol
//! - `orchestrator`: fixed-interval recomputation loop

pub mod cache;
pub mod engine;
pub mod orchestrator;

pub use cache::{CacheEntry, SignalCache};
pub use engine::{AnalysisEngine, TimeframeWindow};
pub use orchestrator::{
    AnalysisOrchestrator, CycleReport, OrchestratorError, OrchestratorSettings, OrchestratorStatus,
};
