//! Domain Layer - Core records of the signal engine
//!
//! Pure data types with no I/O. All external interactions happen through
//! the ports layer.
//!
//! - `bar`: OHLCV bars and boundary validation of bar series
//! - `signal`: trading signals, timeframes and indicator snapshots
//! - `regime`: global market regime records
//! - `sentiment`: composite sentiment records

pub mod bar;
pub mod signal;
pub mod regime;
pub mod sentiment;

pub use bar::{closes, validate_series, volumes, PriceBar, SeriesError};
pub use signal::{
    IndicatorSnapshot, MacdReading, ParseTimeframeError, Signal, SignalKind, SupportResistance,
    Timeframe, VolumeProfile, MAX_CONFIDENCE,
};
pub use regime::{MarketRegime, Regime, RiskLevel, VolatilityLevel};
pub use sentiment::{InstitutionalFlow, SentimentAnalysis, WhaleActivity};
