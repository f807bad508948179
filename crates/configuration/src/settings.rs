use core_types::BackendConfig;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub benchmark: BenchmarkSettings,
    #[serde(default)]
    pub market: MarketSettings,
    pub backends: Vec<BackendSettings>,
}

/// How the benchmark acquires its candle snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Load previously captured snapshots from `dataset_dir`.
    Static,
    /// Capture fresh snapshots for each symbol in `symbols`.
    Realtime,
}

/// Parameters for a single benchmark invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkSettings {
    pub mode: Mode,
    /// Snapshot directory; read in static mode, written in realtime mode.
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: String,
    /// Symbols to capture in realtime mode (e.g. "BTCUSDT").
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Candle interval (e.g. "1h").
    pub interval: String,
    /// Number of candles per snapshot.
    #[serde(default = "default_candle_count")]
    pub candle_count: usize,
    /// Repetitions per backend per snapshot, for statistical analysis.
    #[serde(default = "default_runs")]
    pub runs: usize,
}

/// Parameters for the market-data endpoint used to capture snapshots.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub base_url: String,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            base_url: "https://fapi.binance.com".to_string(),
        }
    }
}

/// One text-generation backend under test.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub name: String,
    pub provider: String,
    pub model: String,
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl From<BackendSettings> for BackendConfig {
    fn from(settings: BackendSettings) -> Self {
        BackendConfig {
            name: settings.name,
            provider: settings.provider,
            model: settings.model,
            api_key: settings.api_key,
            base_url: settings.base_url,
        }
    }
}

fn default_dataset_dir() -> String {
    "datasets/snapshots".to_string()
}

fn default_candle_count() -> usize {
    50
}

fn default_runs() -> usize {
    1
}
