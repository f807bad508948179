use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single OHLCV candlestick observation.
///
/// Times are Unix epoch milliseconds. A slice of `Candle` is always ordered
/// oldest first; indicator calculations depend on that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
}

/// An immutable, timestamped capture of a candle series for one
/// symbol/interval pair. Snapshots make benchmark runs reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub symbol: String,
    pub interval: String,
    /// Capture time, Unix epoch milliseconds.
    pub timestamp: i64,
    pub candles: Vec<Candle>,
}

/// The canonical, ordered list of indicator names.
///
/// These are both the JSON keys a backend must emit and the keys used in
/// error maps and per-indicator statistics.
pub const INDICATOR_NAMES: [&str; 10] = [
    "ma20",
    "ema12",
    "ema26",
    "macd",
    "rsi14",
    "boll_upper",
    "boll_middle",
    "boll_lower",
    "atr14",
    "volume_ma5",
];

/// The ten indicator values computed over one candle series.
///
/// Produced either as ground truth by the indicator calculator or as a
/// candidate answer parsed from backend output. A value of 0 can mean
/// "indicator undefined for this series length" as well as a genuine zero;
/// callers that need to distinguish must re-check the series length.
///
/// `#[serde(default)]` is deliberate: a backend omitting a field decodes to
/// 0, which is then scored as a real deviation rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSet {
    pub ma20: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub macd: f64,
    pub rsi14: f64,
    pub boll_upper: f64,
    pub boll_middle: f64,
    pub boll_lower: f64,
    pub atr14: f64,
    pub volume_ma5: f64,
}

impl IndicatorSet {
    /// Returns the indicator values paired with their canonical names, in
    /// the order of [`INDICATOR_NAMES`].
    pub fn fields(&self) -> [(&'static str, f64); 10] {
        [
            ("ma20", self.ma20),
            ("ema12", self.ema12),
            ("ema26", self.ema26),
            ("macd", self.macd),
            ("rsi14", self.rsi14),
            ("boll_upper", self.boll_upper),
            ("boll_middle", self.boll_middle),
            ("boll_lower", self.boll_lower),
            ("atr14", self.atr14),
            ("volume_ma5", self.volume_ma5),
        ]
    }
}

/// The per-indicator tier scores for one run. Each field is one of
/// {0, 40, 60, 80, 100}.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSet {
    pub ma20: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub macd: f64,
    pub rsi14: f64,
    pub boll_upper: f64,
    pub boll_middle: f64,
    pub boll_lower: f64,
    pub atr14: f64,
    pub volume_ma5: f64,
}

impl ScoreSet {
    pub fn fields(&self) -> [(&'static str, f64); 10] {
        [
            ("ma20", self.ma20),
            ("ema12", self.ema12),
            ("ema26", self.ema26),
            ("macd", self.macd),
            ("rsi14", self.rsi14),
            ("boll_upper", self.boll_upper),
            ("boll_middle", self.boll_middle),
            ("boll_lower", self.boll_lower),
            ("atr14", self.atr14),
            ("volume_ma5", self.volume_ma5),
        ]
    }
}

/// One configured text-generation backend under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Display name, also the grouping key for statistics.
    pub name: String,
    /// Provider tag (e.g. "openai", "deepseek"), used to resolve the
    /// default base URL when no override is given.
    pub provider: String,
    /// Model identifier sent on the wire.
    pub model: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Backend identity metadata carried into results and reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendInfo {
    pub provider: String,
    pub model: String,
    pub display_name: String,
    pub base_url: String,
}

/// The outcome of one (snapshot, backend, run-index) attempt.
///
/// Created exactly once by the task that executed the attempt and never
/// mutated afterwards. A failed attempt carries `error` and leaves
/// `actual`/`scores` unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub snapshot_id: String,
    pub backend: String,
    pub backend_info: BackendInfo,
    pub run_index: usize,
    pub expected: IndicatorSet,
    pub actual: Option<IndicatorSet>,
    pub errors: HashMap<String, f64>,
    pub scores: Option<ScoreSet>,
    pub total_score: f64,
    pub latency_ms: f64,
    pub raw_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
