use chrono::{DateTime, Utc};
use configuration::settings::{Config, Mode};
use core_types::{BackendInfo, RunResult, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The root aggregate produced by one benchmark invocation.
///
/// Fully self-contained: a renderer needs nothing beyond this struct to
/// produce a leaderboard or a per-run detail view. Built once, top to
/// bottom, and never mutated after it is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub id: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub config: ReportConfig,
    pub environment: EnvironmentInfo,
    pub snapshots: Vec<Snapshot>,
    pub results: Vec<RunResult>,
    pub statistics: Vec<BackendStatistics>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Echo of the configuration the benchmark ran with.
///
/// Backends appear as identity metadata only; API keys never enter the
/// report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub mode: String,
    pub dataset_dir: String,
    pub symbols: Vec<String>,
    pub interval: String,
    pub candle_count: usize,
    pub runs: usize,
    pub backends: Vec<BackendInfo>,
}

impl ReportConfig {
    pub fn from_config(config: &Config) -> Self {
        let mode = match config.benchmark.mode {
            Mode::Static => "static",
            Mode::Realtime => "realtime",
        };

        Self {
            mode: mode.to_string(),
            dataset_dir: config.benchmark.dataset_dir.clone(),
            symbols: config.benchmark.symbols.clone(),
            interval: config.benchmark.interval.clone(),
            candle_count: config.benchmark.candle_count,
            runs: config.benchmark.runs.max(1),
            backends: config
                .backends
                .iter()
                .map(|b| BackendInfo {
                    provider: b.provider.clone(),
                    model: b.model.clone(),
                    display_name: b.name.clone(),
                    base_url: b
                        .base_url
                        .clone()
                        .unwrap_or_else(|| api_client::default_base_url(&b.provider).to_string()),
                })
                .collect(),
        }
    }
}

/// Where and when the benchmark ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub version: String,
    pub platform: String,
    pub timestamp: DateTime<Utc>,
    pub timezone: String,
}

impl EnvironmentInfo {
    pub fn capture(version: &str) -> Self {
        Self {
            version: version.to_string(),
            platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
            timestamp: Utc::now(),
            timezone: chrono::Local::now().offset().to_string(),
        }
    }
}

/// Aggregated view over all run results sharing a backend identity.
/// Recomputed wholesale from the results, never incrementally updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendStatistics {
    pub backend: String,
    pub backend_info: BackendInfo,
    pub run_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub avg_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub std_dev: f64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    /// 100 - (std_dev / avg_score * 100), clamped at 0. Higher is better.
    pub consistency: f64,
    pub indicator_avgs: HashMap<String, f64>,
}

/// One row of the ranked leaderboard. Rank is positional: assigned only
/// after sorting, never stored independently of the sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub backend: String,
    pub provider: String,
    pub model: String,
    pub avg_score: f64,
    pub std_dev: f64,
    pub consistency: f64,
    pub avg_latency_ms: f64,
    pub run_count: usize,
}
