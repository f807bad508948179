pub mod error;
pub mod interval;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use interval::validate_interval;
pub use structs::{
    BackendConfig, BackendInfo, Candle, IndicatorSet, RunResult, ScoreSet, Snapshot,
    INDICATOR_NAMES,
};
