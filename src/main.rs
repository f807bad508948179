use api_client::{MarketApi, MarketClient};
use benchmark::report::BenchmarkReport;
use benchmark::Engine;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The main entry point for the quantbench benchmarking application.
#[tokio::main]
async fn main() {
    // Load environment variables (API keys) from an optional .env file.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Run(args) => handle_run(args).await,
        Commands::Capture(args) => handle_capture(args).await,
        Commands::Leaderboard(args) => handle_leaderboard(args),
        Commands::Backends => handle_backends(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Benchmarks text-generation backends on financial indicator accuracy.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the benchmark against every configured backend.
    Run(RunArgs),
    /// Capture market-data snapshots into a dataset directory.
    Capture(CaptureArgs),
    /// Print the leaderboard of a previously saved report.
    Leaderboard(LeaderboardArgs),
    /// List the built-in backend registry with default models and endpoints.
    Backends,
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Directory the report JSON is written into.
    #[arg(long, default_value = "reports")]
    output: PathBuf,
}

#[derive(Parser)]
struct CaptureArgs {
    /// Symbols to capture (e.g. "BTCUSDT"). Repeatable.
    #[arg(long, required = true)]
    symbol: Vec<String>,

    /// The candle interval (e.g. "1h", "4h", "1d").
    #[arg(long, default_value = "1h")]
    interval: String,

    /// Number of candles per snapshot.
    #[arg(long, default_value_t = 50)]
    count: usize,

    /// Directory snapshots are written into.
    #[arg(long, default_value = "datasets/snapshots")]
    dataset_dir: PathBuf,

    /// Market-data endpoint base URL.
    #[arg(long, default_value = "https://fapi.binance.com")]
    base_url: String,
}

#[derive(Parser)]
struct LeaderboardArgs {
    /// Path to a saved report JSON file.
    #[arg(long)]
    report: PathBuf,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

/// Runs the full benchmark: acquire snapshots, fan out to backends,
/// aggregate, print and save the report.
async fn handle_run(args: RunArgs) -> anyhow::Result<()> {
    let config = configuration::load_config(&args.config)?;
    let engine = Engine::new(config)?;

    // Ctrl-C flips the shutdown signal; in-flight backend calls terminate
    // and get recorded as failures instead of being lost.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutdown requested, cancelling in-flight backend calls");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = engine.run(shutdown_rx).await?;

    println!("\n{}", reporting::leaderboard_table(&report.leaderboard));
    for line in reporting::summary_lines(&report) {
        println!("{line}");
    }

    let path = reporting::write_report_json(&report, &args.output)?;
    info!(path = %path.display(), "report written");

    Ok(())
}

/// Captures one snapshot per symbol and refreshes the dataset index.
async fn handle_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let client = MarketClient::new(&args.base_url)?;

    let mut captured = 0usize;
    for symbol in &args.symbol {
        match client
            .fetch_candles(symbol, &args.interval, args.count)
            .await
        {
            Ok(candles) => {
                let snapshot = datastore::new_snapshot(symbol, &args.interval, candles);
                let path = datastore::save_snapshot(&snapshot, &args.dataset_dir)?;
                info!(path = %path.display(), "captured snapshot");
                captured += 1;
            }
            Err(e) => warn!(symbol = %symbol, error = %e, "capture failed"),
        }
    }

    if captured == 0 {
        anyhow::bail!("no snapshots could be captured");
    }

    datastore::update_index(&args.dataset_dir)?;
    println!("Captured {captured} snapshot(s) into {}", args.dataset_dir.display());

    Ok(())
}

/// Prints the backend registry as a starting point for a config file.
fn handle_backends() -> anyhow::Result<()> {
    println!("{}", reporting::backends_table(&api_client::default_backends()));
    println!("Copy an entry into config.toml and supply its API key.");
    Ok(())
}

/// Renders the leaderboard of a saved report.
fn handle_leaderboard(args: LeaderboardArgs) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(Path::new(&args.report))?;
    let report: BenchmarkReport = serde_json::from_str(&data)?;

    println!("Report {} ({})", report.id, report.timestamp);
    println!("{}", reporting::leaderboard_table(&report.leaderboard));

    Ok(())
}
