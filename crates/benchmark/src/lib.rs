//! The benchmark orchestrator.
//!
//! One invocation walks every snapshot, computes ground truth once per
//! snapshot, then fans the shared prompt out to every configured backend
//! for every run index. Tasks in a fan-out group are joined before the
//! next run index starts; snapshots and run indices are strictly
//! sequential. A failing run is recorded and isolated, never propagated.

use crate::error::BenchmarkError;
use crate::prompt::build_indicator_prompt;
use crate::report::{BenchmarkReport, EnvironmentInfo, ReportConfig};
use api_client::{ChatApi, ClientFactory, LlmClientFactory, MarketApi, MarketClient};
use chrono::Utc;
use configuration::settings::{Config, Mode};
use core_types::{BackendConfig, BackendInfo, IndicatorSet, RunResult, Snapshot};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

pub mod error;
pub mod leaderboard;
pub mod parse;
pub mod prompt;
pub mod report;
pub mod statistics;

pub use parse::parse_indicator_response;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Delay between run indices to stay clear of provider rate limits. Not
/// required for correctness.
const INTER_RUN_DELAY: Duration = Duration::from_millis(500);

/// The benchmark engine. Holds only configuration and collaborator
/// handles; all per-invocation state lives inside [`Engine::run`].
pub struct Engine {
    config: Config,
    factory: Arc<dyn ClientFactory>,
    market: Arc<dyn MarketApi>,
}

impl Engine {
    /// Creates an engine wired to the real market-data endpoint and real
    /// chat backends.
    pub fn new(config: Config) -> Result<Self, BenchmarkError> {
        let market = MarketClient::new(&config.market.base_url)?;
        Ok(Self {
            config,
            factory: Arc::new(LlmClientFactory),
            market: Arc::new(market),
        })
    }

    /// Creates an engine with injected collaborators. This is the seam
    /// tests use to substitute scripted backends and market data.
    pub fn with_clients(
        config: Config,
        factory: Arc<dyn ClientFactory>,
        market: Arc<dyn MarketApi>,
    ) -> Self {
        Self {
            config,
            factory,
            market,
        }
    }

    /// Executes the full benchmark and returns the self-contained report.
    ///
    /// The shutdown receiver is threaded through to every backend call; a
    /// signalled shutdown turns in-flight calls into recorded failures
    /// without aborting the batch bookkeeping.
    pub async fn run(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        let runs = self.config.benchmark.runs.max(1);

        let id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let environment = EnvironmentInfo::capture(VERSION);

        let snapshots = self.acquire_snapshots().await?;

        let total = snapshots.len() * self.config.backends.len() * runs;
        info!(
            snapshots = snapshots.len(),
            backends = self.config.backends.len(),
            runs,
            total,
            "starting benchmark"
        );

        let results = Arc::new(Mutex::new(Vec::with_capacity(total)));

        for snapshot in &snapshots {
            // Ground truth and prompt are computed once per snapshot and
            // shared read-only by every backend task.
            let expected = indicators::calculate_all(&snapshot.candles);
            let prompt = Arc::new(build_indicator_prompt(&snapshot.candles));

            info!(snapshot = %snapshot.id, "benchmarking snapshot");

            for run_index in 0..runs {
                if runs > 1 {
                    info!("run {}/{}", run_index + 1, runs);
                }

                let handles: Vec<_> = self
                    .config
                    .backends
                    .iter()
                    .map(|settings| {
                        let backend: BackendConfig = settings.clone().into();
                        // Each task owns its client exclusively.
                        let client = self.factory.make(&backend);
                        let prompt = Arc::clone(&prompt);
                        let results = Arc::clone(&results);
                        let shutdown = shutdown.clone();
                        let snapshot_id = snapshot.id.clone();

                        tokio::spawn(async move {
                            let result = run_single(
                                client,
                                backend,
                                snapshot_id,
                                &prompt,
                                expected,
                                run_index,
                                shutdown,
                            )
                            .await;

                            match &result.error {
                                Some(e) => {
                                    error!(backend = %result.backend, error = %e, "run failed")
                                }
                                None => info!(
                                    backend = %result.backend,
                                    score = result.total_score,
                                    latency_ms = result.latency_ms as u64,
                                    "run complete"
                                ),
                            }

                            // The lock guards only the append, never I/O.
                            results.lock().await.push(result);
                        })
                    })
                    .collect();

                join_all(handles).await;

                if run_index + 1 < runs {
                    tokio::time::sleep(INTER_RUN_DELAY).await;
                }
            }
        }

        let results = match Arc::try_unwrap(results) {
            Ok(mutex) => mutex.into_inner(),
            // All tasks are joined, so this branch should be unreachable;
            // cloning keeps it harmless if it is not.
            Err(arc) => arc.lock().await.clone(),
        };

        let statistics = statistics::aggregate(&results);
        let leaderboard = leaderboard::build(&statistics);

        Ok(BenchmarkReport {
            id,
            version: VERSION.to_string(),
            timestamp: Utc::now(),
            config: ReportConfig::from_config(&self.config),
            environment,
            snapshots,
            results,
            statistics,
            leaderboard,
        })
    }

    /// Loads or captures the snapshot set for this invocation.
    ///
    /// A single symbol failing to capture is logged and skipped; only an
    /// empty snapshot set is fatal.
    async fn acquire_snapshots(&self) -> Result<Vec<Snapshot>, BenchmarkError> {
        let settings = &self.config.benchmark;

        match settings.mode {
            Mode::Static => {
                info!(dir = %settings.dataset_dir, "loading snapshots");
                let snapshots = datastore::load_snapshots(Path::new(&settings.dataset_dir))?;
                if snapshots.is_empty() {
                    return Err(BenchmarkError::NoSnapshots(format!(
                        "no snapshots found in {}",
                        settings.dataset_dir
                    )));
                }
                Ok(snapshots)
            }
            Mode::Realtime => {
                info!(symbols = ?settings.symbols, "capturing realtime snapshots");
                let mut snapshots = Vec::new();

                for symbol in &settings.symbols {
                    let candles = match self
                        .market
                        .fetch_candles(symbol, &settings.interval, settings.candle_count)
                        .await
                    {
                        Ok(candles) => candles,
                        Err(e) => {
                            error!(symbol = %symbol, error = %e, "failed to capture symbol");
                            continue;
                        }
                    };

                    let snapshot = datastore::new_snapshot(symbol, &settings.interval, candles);
                    info!(id = %snapshot.id, "captured snapshot");

                    // Persisted for reproducibility; failure to save does
                    // not invalidate the in-memory snapshot.
                    if let Err(e) =
                        datastore::save_snapshot(&snapshot, Path::new(&settings.dataset_dir))
                    {
                        warn!(error = %e, "failed to save snapshot");
                    }

                    snapshots.push(snapshot);
                }

                if snapshots.is_empty() {
                    return Err(BenchmarkError::NoSnapshots(
                        "no symbols could be captured".to_string(),
                    ));
                }
                Ok(snapshots)
            }
        }
    }
}

/// Executes one (snapshot, backend, run-index) attempt end to end: sends
/// the prompt, times the round trip, parses and scores the reply. Every
/// failure mode lands in the result's `error` field instead of escaping.
async fn run_single(
    client: Box<dyn ChatApi>,
    backend: BackendConfig,
    snapshot_id: String,
    prompt: &str,
    expected: IndicatorSet,
    run_index: usize,
    shutdown: watch::Receiver<bool>,
) -> RunResult {
    let base_url = backend
        .base_url
        .clone()
        .unwrap_or_else(|| api_client::default_base_url(&backend.provider).to_string());

    let mut result = RunResult {
        snapshot_id,
        backend: backend.name.clone(),
        backend_info: BackendInfo {
            provider: backend.provider.clone(),
            model: backend.model.clone(),
            display_name: backend.name.clone(),
            base_url,
        },
        run_index,
        expected,
        actual: None,
        errors: HashMap::new(),
        scores: None,
        total_score: 0.0,
        latency_ms: 0.0,
        raw_output: String::new(),
        error: None,
    };

    let start = Instant::now();
    let response = client.chat(prompt, shutdown).await;
    result.latency_ms = start.elapsed().as_secs_f64() * 1_000.0;

    let response = match response {
        Ok(text) => text,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };
    result.raw_output = response.clone();

    let actual = match parse_indicator_response(&response) {
        Ok(actual) => actual,
        Err(e) => {
            result.error = Some(format!("parse response: {e}"));
            return result;
        }
    };

    let (scores, errors) = scoring::score_indicators(&expected, &actual);
    result.total_score = scoring::total_score(&scores);
    result.actual = Some(actual);
    result.scores = Some(scores);
    result.errors = errors;

    result
}
